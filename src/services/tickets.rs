//! Ticket identifiers and ticket delivery
//!
//! Delivery is best-effort: a confirmed registration stays confirmed even when
//! the ticket email cannot be sent.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::distributions::Uniform;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::settings::{EmailConfig, TicketConfig};
use crate::models::{Event, EventKind, Registration, User};
use crate::utils::errors::Result;
use crate::utils::helpers::format_timestamp;

const TICKET_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generates `PREFIX-XXXXXX` ticket identifiers
#[derive(Debug, Clone)]
pub struct TicketIssuer {
    prefix: String,
    code_length: usize,
}

impl TicketIssuer {
    pub fn new(config: &TicketConfig) -> Self {
        Self {
            prefix: config.prefix.clone(),
            code_length: config.code_length,
        }
    }

    pub fn issue(&self) -> String {
        let mut rng = rand::thread_rng();
        let index = Uniform::from(0..TICKET_ALPHABET.len());
        let code: String = (0..self.code_length)
            .map(|_| TICKET_ALPHABET[rng.sample(index)] as char)
            .collect();
        format!("{}-{}", self.prefix, code)
    }
}

/// Fields carried by a ticket email
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TicketEmail {
    pub ticket_id: String,
    pub event_name: String,
    pub event_start: Option<DateTime<Utc>>,
    pub event_end: Option<DateTime<Utc>>,
    pub event_kind: EventKind,
    pub fee: Option<i32>,
    pub participant_name: String,
}

impl TicketEmail {
    pub fn new(ticket_id: &str, event: &Event, participant: &User) -> Self {
        Self {
            ticket_id: ticket_id.to_string(),
            event_name: event.name.clone(),
            event_start: event.event_start,
            event_end: event.event_end,
            event_kind: event.kind,
            fee: event.registration_fee,
            participant_name: participant.display_name(),
        }
    }

    pub fn subject(&self) -> String {
        format!("Registration Confirmed - {}", self.event_name)
    }

    /// Plain-text body
    pub fn body(&self) -> String {
        let when = match (self.event_start, self.event_end) {
            (Some(start), Some(end)) => format!("{} - {}", format_timestamp(start), format_timestamp(end)),
            (Some(start), None) => format_timestamp(start),
            _ => "TBA".to_string(),
        };
        let fee = match self.fee {
            Some(fee) if fee > 0 => fee.to_string(),
            _ => "Free".to_string(),
        };

        format!(
            "Hi {},\n\nYou are registered for {}.\n\nTicket ID: {}\nEvent type: {}\nWhen: {}\nFee: {}\n\nShow this ticket at the entrance.\n",
            self.participant_name, self.event_name, self.ticket_id, self.event_kind, when, fee
        )
    }
}

/// Outbound ticket delivery
#[async_trait]
pub trait TicketMailer: Send + Sync {
    async fn send_ticket_email(&self, to: &str, ticket: &TicketEmail) -> Result<()>;
}

/// Mailer that records deliveries in the log instead of sending them
#[derive(Debug, Clone)]
pub struct LogMailer {
    from_address: String,
    enabled: bool,
}

impl LogMailer {
    pub fn new(config: &EmailConfig) -> Self {
        Self {
            from_address: config.from_address.clone(),
            enabled: config.enabled,
        }
    }
}

#[async_trait]
impl TicketMailer for LogMailer {
    async fn send_ticket_email(&self, to: &str, ticket: &TicketEmail) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        info!(
            from = %self.from_address,
            to = to,
            ticket_id = %ticket.ticket_id,
            subject = %ticket.subject(),
            "Ticket email dispatched"
        );
        debug!(to = to, body = %ticket.body(), "Ticket email body");
        Ok(())
    }
}

/// Send a ticket for `registration`, logging instead of failing on any problem
pub async fn deliver_ticket(mailer: &dyn TicketMailer, event: &Event, participant: Option<&User>, registration: &Registration) {
    let Some(ticket_id) = registration.ticket_id.as_deref() else {
        return;
    };
    let Some(participant) = participant else {
        warn!(registration_id = registration.id, participant_id = registration.participant_id, "Ticket not sent: participant record missing");
        return;
    };

    let email = TicketEmail::new(ticket_id, event, participant);
    if let Err(e) = mailer.send_ticket_email(&participant.email, &email).await {
        warn!(
            registration_id = registration.id,
            ticket_id = ticket_id,
            error = %e,
            "Ticket email delivery failed"
        );
    }
}
