//! Storage traits
//!
//! Services talk to persistence only through these traits. Every method that
//! guards an invariant (capacity, uniqueness, stock, single settlement, single
//! check-in) is one atomic step in the implementation, so callers never need a
//! read-check-write sequence of their own.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{
    CascadeSummary, CreateEventRequest, CreateUserRequest, Event, EventStatus, InsertOutcome,
    NewRegistration, PaymentDecision, ProofOutcome, PublishedEventFilter, Registration, UpdateEventRequest,
    User, UserRole,
};
use crate::utils::errors::Result;

#[async_trait]
pub trait EventStore: Send + Sync {
    /// Insert a new Draft event owned by `organizer_id`
    async fn create(&self, organizer_id: i64, request: &CreateEventRequest) -> Result<Event>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Event>>;

    /// Apply the present fields of `changes`; `None` when the event is gone
    async fn update(&self, id: i64, changes: &UpdateEventRequest) -> Result<Option<Event>>;

    /// Compare-and-set on status; `None` when the current status is not `expected`
    async fn update_status_if(&self, id: i64, expected: EventStatus, new: EventStatus) -> Result<Option<Event>>;

    async fn delete(&self, id: i64) -> Result<bool>;

    async fn list_by_organizer(&self, organizer_id: i64) -> Result<Vec<Event>>;

    /// Published events matching `filter`, ordered by start time
    async fn list_published(&self, filter: &PublishedEventFilter) -> Result<Vec<Event>>;

    /// Decrement stock iff at least `quantity` remains; returns the new stock
    async fn try_decrement_stock(&self, id: i64, quantity: i32) -> Result<Option<i32>>;

    /// Return `quantity` units to stock; `None` when the event is gone
    async fn increment_stock(&self, id: i64, quantity: i32) -> Result<Option<i32>>;
}

#[async_trait]
pub trait RegistrationStore: Send + Sync {
    /// Insert unless the participant already holds a registration for the event
    /// or the event already has `limit` non-cancelled registrations
    async fn insert_if_admissible(&self, registration: NewRegistration, limit: Option<i32>) -> Result<InsertOutcome>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Registration>>;

    async fn find_by_ticket(&self, ticket_id: &str) -> Result<Option<Registration>>;

    async fn find_for_participant(&self, event_id: i64, participant_id: i64) -> Result<Option<Registration>>;

    async fn list_for_event(&self, event_id: i64) -> Result<Vec<Registration>>;

    async fn list_for_events(&self, event_ids: &[i64]) -> Result<Vec<Registration>>;

    /// A participant's registrations, newest first
    async fn list_for_participant(&self, participant_id: i64) -> Result<Vec<Registration>>;

    /// All registrations referencing the event, whatever their status
    async fn count_for_event(&self, event_id: i64) -> Result<i64>;

    async fn count_active_for_event(&self, event_id: i64) -> Result<i64>;

    /// Settle a payment iff both the order and its payment are still Pending
    async fn settle_payment(&self, id: i64, decision: &PaymentDecision) -> Result<Option<Registration>>;

    /// Cancel iff the registration is Confirmed or Pending
    async fn cancel(&self, id: i64) -> Result<Option<Registration>>;

    /// Record attendance iff not yet recorded (and, when `reject_cancelled`, not cancelled)
    async fn mark_attended(&self, id: i64, at: DateTime<Utc>, reject_cancelled: bool) -> Result<Option<Registration>>;

    /// Replace the payment proof and reset the payment to Pending, unless already Approved.
    /// A rejected order goes back to Pending review only while the event has
    /// fewer than `limit` non-cancelled registrations.
    async fn replace_payment_proof(&self, id: i64, proof: &str, limit: Option<i32>) -> Result<ProofOutcome>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, request: &CreateUserRequest) -> Result<User>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn list_by_role(&self, role: UserRole) -> Result<Vec<User>>;

    async fn exists_with_role(&self, role: UserRole) -> Result<bool>;

    async fn set_disabled(&self, id: i64, disabled: bool) -> Result<Option<User>>;

    /// Remove an organizer with its events and their registrations, all or nothing
    async fn delete_organizer_cascade(&self, id: i64) -> Result<CascadeSummary>;

    async fn health_check(&self) -> Result<()>;
}
