//! Payment and stock settlement for merchandise orders
//!
//! Stock is only taken at approval and only given back when a previously
//! approved order is cancelled. Each operation is one atomic store update
//! plus at most one compensating update on the other entity.

use std::sync::Arc;

use tracing::{error, instrument, warn};

use crate::database::DatabaseService;
use crate::models::{Caller, Event, PaymentDecision, PaymentStatus, Registration};
use crate::services::events::EventService;
use crate::services::tickets::{deliver_ticket, TicketIssuer, TicketMailer};
use crate::utils::errors::{CampusEventsError, Result};
use crate::utils::logging::{log_inconsistency, log_registration_action, log_stock_change};

#[derive(Clone)]
pub struct SettlementService {
    db: DatabaseService,
    events: EventService,
    tickets: TicketIssuer,
    mailer: Arc<dyn TicketMailer>,
}

impl SettlementService {
    pub fn new(db: DatabaseService, events: EventService, tickets: TicketIssuer, mailer: Arc<dyn TicketMailer>) -> Self {
        Self { db, events, tickets, mailer }
    }

    /// Approve a pending order: take stock, confirm, issue a ticket
    #[instrument(skip(self), fields(organizer_id = caller.user_id))]
    pub async fn approve_payment(&self, caller: &Caller, registration_id: i64) -> Result<Registration> {
        self.events.require_active_organizer(caller).await?;
        let (registration, event) = self.owned_order(caller, registration_id).await?;
        ensure_pending(&registration)?;

        let quantity = registration.quantity;
        let remaining = self
            .db
            .events
            .try_decrement_stock(event.id, quantity)
            .await?
            .ok_or_else(|| CampusEventsError::OutOfStock { requested: quantity, available: event.available_stock() })?;
        log_stock_change(event.id, registration_id, -quantity, remaining);

        let decision = PaymentDecision::Approve { ticket_id: self.tickets.issue() };
        let approved = match self.db.registrations.settle_payment(registration_id, &decision).await {
            Ok(Some(approved)) => approved,
            Ok(None) => {
                // Another settlement won the race; hand the stock back
                self.restore_stock(&event, registration_id, quantity, "approve_lost_race").await?;
                let current = self.find_registration(registration_id).await?;
                return Err(settlement_conflict(&current));
            }
            Err(e) => {
                log_inconsistency("approve_payment", event.id, registration_id, &e.to_string());
                return Err(CampusEventsError::InconsistentState(format!(
                    "Stock for event {} was reduced by {} but registration {} could not be confirmed: {}",
                    event.id, quantity, registration_id, e
                )));
            }
        };

        log_registration_action(registration_id, event.id, "payment_approved", caller.user_id);

        let participant = self.db.users.find_by_id(approved.participant_id).await.unwrap_or_else(|e| {
            warn!(error = %e, registration_id = registration_id, "Participant lookup for ticket delivery failed");
            None
        });
        deliver_ticket(self.mailer.as_ref(), &event, participant.as_ref(), &approved).await;

        Ok(approved)
    }

    /// Reject a pending order. Stock is untouched.
    #[instrument(skip(self), fields(organizer_id = caller.user_id))]
    pub async fn reject_payment(&self, caller: &Caller, registration_id: i64) -> Result<Registration> {
        self.events.require_active_organizer(caller).await?;
        let (registration, event) = self.owned_order(caller, registration_id).await?;
        ensure_pending(&registration)?;

        match self.db.registrations.settle_payment(registration_id, &PaymentDecision::Reject).await? {
            Some(rejected) => {
                log_registration_action(registration_id, event.id, "payment_rejected", caller.user_id);
                Ok(rejected)
            }
            None => {
                let current = self.find_registration(registration_id).await?;
                Err(settlement_conflict(&current))
            }
        }
    }

    /// Participant cancels their own Confirmed or Pending registration
    #[instrument(skip(self), fields(participant_id = caller.user_id))]
    pub async fn cancel_registration(&self, caller: &Caller, registration_id: i64) -> Result<Registration> {
        let registration = self.find_registration(registration_id).await?;
        if registration.participant_id != caller.user_id {
            return Err(CampusEventsError::Forbidden("Not the registration owner".to_string()));
        }

        let cancelled = self.db.registrations.cancel(registration_id).await?.ok_or_else(|| {
            CampusEventsError::InvalidTransition(format!(
                "Only Confirmed or Pending registrations can be cancelled (status: {})",
                registration.status
            ))
        })?;
        log_registration_action(registration_id, cancelled.event_id, "cancelled", caller.user_id);

        if cancelled.holds_stock() {
            match self.db.events.find_by_id(cancelled.event_id).await {
                Ok(Some(event)) if event.is_merchandise() => {
                    self.restore_stock(&event, registration_id, cancelled.quantity, "cancel_registration").await?;
                }
                Ok(_) => {}
                Err(e) => {
                    log_inconsistency("cancel_registration", cancelled.event_id, registration_id, &e.to_string());
                    return Err(CampusEventsError::InconsistentState(format!(
                        "Registration {} was cancelled but stock for event {} could not be restored: {}",
                        registration_id, cancelled.event_id, e
                    )));
                }
            }
        }

        Ok(cancelled)
    }

    /// Compensating stock increment; any failure here needs manual reconciliation
    async fn restore_stock(&self, event: &Event, registration_id: i64, quantity: i32, operation: &str) -> Result<()> {
        match self.db.events.increment_stock(event.id, quantity).await {
            Ok(Some(remaining)) => {
                log_stock_change(event.id, registration_id, quantity, remaining);
                Ok(())
            }
            Ok(None) => {
                // Event deleted in the meantime; there is no stock left to restore
                warn!(event_id = event.id, registration_id = registration_id, "Stock not restored: event no longer exists");
                Ok(())
            }
            Err(e) => {
                log_inconsistency(operation, event.id, registration_id, &e.to_string());
                error!(event_id = event.id, quantity = quantity, "Stock restore failed");
                Err(CampusEventsError::InconsistentState(format!(
                    "{} units of stock for event {} could not be restored after registration {}: {}",
                    quantity, event.id, registration_id, e
                )))
            }
        }
    }

    async fn find_registration(&self, id: i64) -> Result<Registration> {
        self.db
            .registrations
            .find_by_id(id)
            .await?
            .ok_or_else(|| CampusEventsError::not_found("Registration", id))
    }

    /// A merchandise order on an event the caller owns
    async fn owned_order(&self, caller: &Caller, registration_id: i64) -> Result<(Registration, Event)> {
        let registration = self.find_registration(registration_id).await?;
        let event = self.events.owned_event(caller, registration.event_id).await?;
        if !event.is_merchandise() || registration.payment_status.is_none() {
            return Err(CampusEventsError::InvalidInput(format!(
                "Registration {} is not a merchandise order",
                registration_id
            )));
        }
        Ok((registration, event))
    }
}

fn ensure_pending(registration: &Registration) -> Result<()> {
    if registration.payment_status == Some(PaymentStatus::Pending) && !registration.is_cancelled() {
        Ok(())
    } else {
        Err(settlement_conflict(registration))
    }
}

/// Why an order can no longer be approved or rejected
fn settlement_conflict(registration: &Registration) -> CampusEventsError {
    match registration.payment_status {
        Some(PaymentStatus::Pending) if registration.is_cancelled() => {
            CampusEventsError::InvalidTransition("Order was cancelled by the participant".to_string())
        }
        Some(status) => CampusEventsError::AlreadySettled(status.to_string()),
        None => CampusEventsError::AlreadySettled("none".to_string()),
    }
}
