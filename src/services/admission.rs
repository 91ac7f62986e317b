//! Registration admission
//!
//! Checks run in a fixed order and the first failure wins:
//! event exists, deadline, duplicate, capacity, then the merchandise purchase
//! limit and stock. Event status is not consulted. Duplicate and capacity are
//! checked again atomically by the store when the row is inserted.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, instrument};

use crate::database::DatabaseService;
use crate::models::{
    Admission, Caller, Event, EventSummary, FieldType, FormResponse, InsertOutcome, NewRegistration,
    ParticipantEntry, ParticipantInfo, PaymentStatus, ProofOutcome, RegisterRequest, Registration, RegistrationStatus,
    RegistrationWithEvent, User, UserRole,
};
use crate::services::events::EventService;
use crate::services::tickets::{deliver_ticket, TicketIssuer, TicketMailer};
use crate::utils::errors::{CampusEventsError, Result};
use crate::utils::logging::log_registration_action;

#[derive(Clone)]
pub struct RegistrationService {
    db: DatabaseService,
    events: EventService,
    tickets: TicketIssuer,
    mailer: Arc<dyn TicketMailer>,
}

impl RegistrationService {
    pub fn new(db: DatabaseService, events: EventService, tickets: TicketIssuer, mailer: Arc<dyn TicketMailer>) -> Self {
        Self { db, events, tickets, mailer }
    }

    /// Admit a participant: a ticket for Normal events, a pending order for merchandise
    #[instrument(skip(self, request), fields(participant_id = caller.user_id, event_id = request.event_id))]
    pub async fn register(&self, caller: &Caller, request: RegisterRequest) -> Result<Admission> {
        caller.require_role(UserRole::Participant)?;

        let event = self.events.find_event(request.event_id).await?;
        if event.registration_deadline.is_some_and(|deadline| Utc::now() > deadline) {
            return Err(CampusEventsError::DeadlinePassed);
        }

        if self.db.registrations.find_for_participant(event.id, caller.user_id).await?.is_some() {
            return Err(CampusEventsError::AlreadyRegistered);
        }
        if let Some(limit) = event.registration_limit {
            let active = self.db.registrations.count_active_for_event(event.id).await?;
            if active >= i64::from(limit) {
                return Err(CampusEventsError::CapacityReached);
            }
        }

        let quantity = request.quantity.unwrap_or(1);
        if quantity < 1 {
            return Err(CampusEventsError::InvalidInput("Quantity must be at least 1".to_string()));
        }

        let new_registration = if event.is_merchandise() {
            if quantity > event.purchase_limit {
                return Err(CampusEventsError::PurchaseLimitExceeded { requested: quantity, limit: event.purchase_limit });
            }
            if quantity > event.available_stock() {
                return Err(CampusEventsError::OutOfStock { requested: quantity, available: event.available_stock() });
            }
            validate_choice("size", request.size.as_deref(), &event.sizes)?;
            validate_choice("color", request.color.as_deref(), &event.colors)?;
            validate_choice("variant", request.variant.as_deref(), &event.variants)?;

            NewRegistration {
                event_id: event.id,
                participant_id: caller.user_id,
                status: RegistrationStatus::Pending,
                responses: Vec::new(),
                ticket_id: None,
                size: request.size,
                color: request.color,
                variant: request.variant,
                quantity,
                payment_proof: request.payment_proof,
                payment_status: Some(PaymentStatus::Pending),
            }
        } else {
            validate_responses(&event, &request.responses)?;

            NewRegistration {
                event_id: event.id,
                participant_id: caller.user_id,
                status: RegistrationStatus::Confirmed,
                responses: request.responses,
                ticket_id: Some(self.tickets.issue()),
                size: request.size,
                color: request.color,
                variant: request.variant,
                quantity,
                payment_proof: None,
                payment_status: None,
            }
        };

        let registration = match self
            .db
            .registrations
            .insert_if_admissible(new_registration, event.registration_limit)
            .await?
        {
            InsertOutcome::Inserted(registration) => registration,
            InsertOutcome::Duplicate => return Err(CampusEventsError::AlreadyRegistered),
            InsertOutcome::CapacityReached => return Err(CampusEventsError::CapacityReached),
        };

        if event.is_merchandise() {
            log_registration_action(registration.id, event.id, "order_placed", caller.user_id);
            return Ok(Admission::OrderPlaced(registration));
        }

        log_registration_action(registration.id, event.id, "registered", caller.user_id);
        let participant = self.db.users.find_by_id(caller.user_id).await.unwrap_or_else(|e| {
            debug!(error = %e, "Participant lookup for ticket delivery failed");
            None
        });
        deliver_ticket(self.mailer.as_ref(), &event, participant.as_ref(), &registration).await;

        Ok(Admission::Ticketed(registration))
    }

    /// Replace the payment proof on the caller's own order and send it back for review
    pub async fn upload_payment_proof(&self, caller: &Caller, registration_id: i64, proof: String) -> Result<Registration> {
        if proof.trim().is_empty() {
            return Err(CampusEventsError::InvalidInput("Payment proof reference is required".to_string()));
        }

        let registration = self.find_registration(registration_id).await?;
        if registration.participant_id != caller.user_id {
            return Err(CampusEventsError::Forbidden("Not the registration owner".to_string()));
        }
        match registration.payment_status {
            None => {
                return Err(CampusEventsError::InvalidInput("Registration is not a merchandise order".to_string()));
            }
            Some(PaymentStatus::Approved) => {
                return Err(CampusEventsError::AlreadySettled(PaymentStatus::Approved.to_string()));
            }
            // Withdrawn by the participant; only an organizer rejection can be resubmitted
            Some(PaymentStatus::Pending) if registration.is_cancelled() => {
                return Err(CampusEventsError::InvalidTransition("Registration is cancelled".to_string()));
            }
            _ => {}
        }

        let limit = self
            .db
            .events
            .find_by_id(registration.event_id)
            .await?
            .and_then(|event| event.registration_limit);
        let updated = match self.db.registrations.replace_payment_proof(registration_id, &proof, limit).await? {
            ProofOutcome::Replaced(updated) => updated,
            ProofOutcome::Unchanged => {
                return Err(CampusEventsError::AlreadySettled(PaymentStatus::Approved.to_string()));
            }
            ProofOutcome::CapacityReached => return Err(CampusEventsError::CapacityReached),
        };

        log_registration_action(registration_id, updated.event_id, "payment_proof_uploaded", caller.user_id);
        Ok(updated)
    }

    /// The caller's registrations, newest first, each with its event
    pub async fn history(&self, caller: &Caller) -> Result<Vec<RegistrationWithEvent>> {
        let registrations = self.db.registrations.list_for_participant(caller.user_id).await?;

        let mut events: HashMap<i64, EventSummary> = HashMap::new();
        let mut history = Vec::with_capacity(registrations.len());
        for registration in registrations {
            let summary = match events.get(&registration.event_id) {
                Some(summary) => summary.clone(),
                None => {
                    let summary = match self.db.events.find_by_id(registration.event_id).await? {
                        Some(event) => EventSummary::from(&self.events.refresh_status(event).await?),
                        None => EventSummary::deleted(registration.event_id),
                    };
                    events.insert(registration.event_id, summary.clone());
                    summary
                }
            };
            history.push(RegistrationWithEvent { registration, event: summary });
        }

        Ok(history)
    }

    /// Every registration (or order) for an event the caller owns
    pub async fn event_registrations(&self, caller: &Caller, event_id: i64) -> Result<Vec<ParticipantEntry>> {
        self.events.owned_event(caller, event_id).await?;
        let registrations = self.db.registrations.list_for_event(event_id).await?;

        let mut entries = Vec::with_capacity(registrations.len());
        for registration in registrations {
            let participant = self.participant_info(registration.participant_id).await?;
            entries.push(ParticipantEntry { registration, participant });
        }
        Ok(entries)
    }

    pub async fn find_registration(&self, id: i64) -> Result<Registration> {
        self.db
            .registrations
            .find_by_id(id)
            .await?
            .ok_or_else(|| CampusEventsError::not_found("Registration", id))
    }

    /// Contact details for a participant, tolerating a missing user record
    pub async fn participant_info(&self, participant_id: i64) -> Result<ParticipantInfo> {
        let user = self.db.users.find_by_id(participant_id).await?;
        Ok(participant_info(participant_id, user.as_ref()))
    }
}

pub fn participant_info(participant_id: i64, user: Option<&User>) -> ParticipantInfo {
    match user {
        Some(user) => ParticipantInfo {
            id: user.id,
            name: user.display_name(),
            email: Some(user.email.clone()),
        },
        None => ParticipantInfo {
            id: participant_id,
            name: "Unknown participant".to_string(),
            email: None,
        },
    }
}

/// A selected option must be one of the event's offered values, when it offers any
fn validate_choice(field: &str, selected: Option<&str>, offered: &[String]) -> Result<()> {
    match selected {
        Some(value) if !offered.is_empty() && !offered.iter().any(|o| o == value) => Err(
            CampusEventsError::InvalidInput(format!("Unknown {} '{}'", field, value)),
        ),
        _ => Ok(()),
    }
}

/// Every required form field must be answered; dropdown answers must be listed options
fn validate_responses(event: &Event, responses: &[FormResponse]) -> Result<()> {
    for field in &event.form {
        let answer = responses.iter().find(|r| r.label == field.label);
        let filled = answer.is_some_and(FormResponse::is_filled);

        if field.required && !filled {
            return Err(CampusEventsError::InvalidInput(format!("Missing required field '{}'", field.label)));
        }

        if let (FieldType::Dropdown, Some(answer)) = (field.field_type, answer) {
            if let Some(choice) = answer.value.as_str() {
                if !field.options.is_empty() && !field.options.iter().any(|o| o == choice) {
                    return Err(CampusEventsError::InvalidInput(format!(
                        "'{}' is not an option for '{}'",
                        choice, field.label
                    )));
                }
            }
        }
    }
    Ok(())
}
