//! In-process store
//!
//! Backs `memory://` database URLs and the test suite. A single mutex guards
//! all tables, so every trait method is atomic with respect to the others.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::database::store::{EventStore, RegistrationStore, UserStore};
use crate::models::{
    CascadeSummary, CreateEventRequest, CreateUserRequest, Event, EventStatus, InsertOutcome,
    NewRegistration, PaymentDecision, PaymentStatus, ProofOutcome, PublishedEventFilter, Registration,
    RegistrationStatus, UpdateEventRequest, User, UserRole,
};
use crate::utils::errors::{CampusEventsError, Result};

#[derive(Debug, Default)]
struct MemoryState {
    users: BTreeMap<i64, User>,
    events: BTreeMap<i64, Event>,
    registrations: BTreeMap<i64, Registration>,
    next_user_id: i64,
    next_event_id: i64,
    next_registration_id: i64,
}

impl MemoryState {
    fn next_id(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Overwrite a stored event, bypassing lifecycle rules. Used to set up
    /// fixtures such as events whose deadline already passed.
    pub fn put_event(&self, event: Event) {
        let mut state = self.lock();
        if event.id > state.next_event_id {
            state.next_event_id = event.id;
        }
        state.events.insert(event.id, event);
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn create(&self, organizer_id: i64, request: &CreateEventRequest) -> Result<Event> {
        let mut state = self.lock();
        let id = MemoryState::next_id(&mut state.next_event_id);
        let now = Utc::now();

        let event = Event {
            id,
            organizer_id,
            name: request.name.clone(),
            description: request.description.clone(),
            kind: request.kind,
            eligibility: request.eligibility.clone(),
            tags: request.tags.clone(),
            registration_deadline: request.registration_deadline,
            event_start: request.event_start,
            event_end: request.event_end,
            registration_limit: request.registration_limit,
            registration_fee: request.registration_fee,
            sizes: request.sizes.clone(),
            colors: request.colors.clone(),
            variants: request.variants.clone(),
            quantity: request.quantity,
            purchase_limit: request.purchase_limit.unwrap_or(1),
            status: EventStatus::Draft,
            form: request.form.clone(),
            created_at: now,
            updated_at: now,
        };
        state.events.insert(id, event.clone());
        Ok(event)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Event>> {
        Ok(self.lock().events.get(&id).cloned())
    }

    async fn update(&self, id: i64, changes: &UpdateEventRequest) -> Result<Option<Event>> {
        let mut state = self.lock();
        let Some(event) = state.events.get_mut(&id) else {
            return Ok(None);
        };

        fn set<T: Clone>(target: &mut T, value: &Option<T>) {
            if let Some(value) = value {
                *target = value.clone();
            }
        }
        fn set_opt<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
            if value.is_some() {
                *target = value.clone();
            }
        }

        set(&mut event.name, &changes.name);
        set_opt(&mut event.description, &changes.description);
        set(&mut event.kind, &changes.kind);
        set_opt(&mut event.eligibility, &changes.eligibility);
        set(&mut event.tags, &changes.tags);
        set_opt(&mut event.registration_deadline, &changes.registration_deadline);
        set_opt(&mut event.event_start, &changes.event_start);
        set_opt(&mut event.event_end, &changes.event_end);
        set_opt(&mut event.registration_limit, &changes.registration_limit);
        set_opt(&mut event.registration_fee, &changes.registration_fee);
        set(&mut event.sizes, &changes.sizes);
        set(&mut event.colors, &changes.colors);
        set(&mut event.variants, &changes.variants);
        set_opt(&mut event.quantity, &changes.quantity);
        set(&mut event.purchase_limit, &changes.purchase_limit);
        set(&mut event.form, &changes.form);
        set(&mut event.status, &changes.status);
        event.updated_at = Utc::now();

        Ok(Some(event.clone()))
    }

    async fn update_status_if(&self, id: i64, expected: EventStatus, new: EventStatus) -> Result<Option<Event>> {
        let mut state = self.lock();
        match state.events.get_mut(&id) {
            Some(event) if event.status == expected => {
                event.status = new;
                event.updated_at = Utc::now();
                Ok(Some(event.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        Ok(self.lock().events.remove(&id).is_some())
    }

    async fn list_by_organizer(&self, organizer_id: i64) -> Result<Vec<Event>> {
        let state = self.lock();
        let mut events: Vec<Event> = state
            .events
            .values()
            .filter(|event| event.organizer_id == organizer_id)
            .cloned()
            .collect();
        events.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(events)
    }

    async fn list_published(&self, filter: &PublishedEventFilter) -> Result<Vec<Event>> {
        let state = self.lock();
        let mut events: Vec<Event> = state
            .events
            .values()
            .filter(|event| event.status == EventStatus::Published && filter.matches(event))
            .cloned()
            .collect();
        // Undated events sort last
        events.sort_by_key(|event| (event.event_start.is_none(), event.event_start, event.id));
        Ok(events)
    }

    async fn try_decrement_stock(&self, id: i64, quantity: i32) -> Result<Option<i32>> {
        let mut state = self.lock();
        let Some(event) = state.events.get_mut(&id) else {
            return Ok(None);
        };
        match event.quantity {
            Some(stock) if stock >= quantity => {
                event.quantity = Some(stock - quantity);
                event.updated_at = Utc::now();
                Ok(event.quantity)
            }
            _ => Ok(None),
        }
    }

    async fn increment_stock(&self, id: i64, quantity: i32) -> Result<Option<i32>> {
        let mut state = self.lock();
        let Some(event) = state.events.get_mut(&id) else {
            return Ok(None);
        };
        let stock = event.quantity.unwrap_or(0) + quantity;
        event.quantity = Some(stock);
        event.updated_at = Utc::now();
        Ok(Some(stock))
    }
}

#[async_trait]
impl RegistrationStore for MemoryStore {
    async fn insert_if_admissible(&self, registration: NewRegistration, limit: Option<i32>) -> Result<InsertOutcome> {
        let mut state = self.lock();
        if !state.events.contains_key(&registration.event_id) {
            return Err(CampusEventsError::not_found("Event", registration.event_id));
        }

        let mut active = 0i64;
        for existing in state.registrations.values().filter(|r| r.event_id == registration.event_id) {
            if existing.participant_id == registration.participant_id {
                return Ok(InsertOutcome::Duplicate);
            }
            if !existing.is_cancelled() {
                active += 1;
            }
        }
        if limit.is_some_and(|limit| active >= i64::from(limit)) {
            return Ok(InsertOutcome::CapacityReached);
        }

        let id = MemoryState::next_id(&mut state.next_registration_id);
        let now = Utc::now();
        let inserted = Registration {
            id,
            event_id: registration.event_id,
            participant_id: registration.participant_id,
            status: registration.status,
            responses: registration.responses,
            ticket_id: registration.ticket_id,
            size: registration.size,
            color: registration.color,
            variant: registration.variant,
            quantity: registration.quantity,
            payment_proof: registration.payment_proof,
            payment_status: registration.payment_status,
            attended_at: None,
            created_at: now,
            updated_at: now,
        };
        state.registrations.insert(id, inserted.clone());
        Ok(InsertOutcome::Inserted(inserted))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Registration>> {
        Ok(self.lock().registrations.get(&id).cloned())
    }

    async fn find_by_ticket(&self, ticket_id: &str) -> Result<Option<Registration>> {
        let state = self.lock();
        Ok(state
            .registrations
            .values()
            .find(|r| r.ticket_id.as_deref() == Some(ticket_id))
            .cloned())
    }

    async fn find_for_participant(&self, event_id: i64, participant_id: i64) -> Result<Option<Registration>> {
        let state = self.lock();
        Ok(state
            .registrations
            .values()
            .find(|r| r.event_id == event_id && r.participant_id == participant_id)
            .cloned())
    }

    async fn list_for_event(&self, event_id: i64) -> Result<Vec<Registration>> {
        let state = self.lock();
        Ok(state
            .registrations
            .values()
            .filter(|r| r.event_id == event_id)
            .cloned()
            .collect())
    }

    async fn list_for_events(&self, event_ids: &[i64]) -> Result<Vec<Registration>> {
        let state = self.lock();
        Ok(state
            .registrations
            .values()
            .filter(|r| event_ids.contains(&r.event_id))
            .cloned()
            .collect())
    }

    async fn list_for_participant(&self, participant_id: i64) -> Result<Vec<Registration>> {
        let state = self.lock();
        Ok(state
            .registrations
            .values()
            .rev()
            .filter(|r| r.participant_id == participant_id)
            .cloned()
            .collect())
    }

    async fn count_for_event(&self, event_id: i64) -> Result<i64> {
        let state = self.lock();
        Ok(state.registrations.values().filter(|r| r.event_id == event_id).count() as i64)
    }

    async fn count_active_for_event(&self, event_id: i64) -> Result<i64> {
        let state = self.lock();
        Ok(state
            .registrations
            .values()
            .filter(|r| r.event_id == event_id && !r.is_cancelled())
            .count() as i64)
    }

    async fn settle_payment(&self, id: i64, decision: &PaymentDecision) -> Result<Option<Registration>> {
        let mut state = self.lock();
        let Some(registration) = state.registrations.get_mut(&id) else {
            return Ok(None);
        };
        if registration.payment_status != Some(PaymentStatus::Pending)
            || registration.status != RegistrationStatus::Pending
        {
            return Ok(None);
        }

        match decision {
            PaymentDecision::Approve { ticket_id } => {
                registration.payment_status = Some(PaymentStatus::Approved);
                registration.status = RegistrationStatus::Confirmed;
                registration.ticket_id = Some(ticket_id.clone());
            }
            PaymentDecision::Reject => {
                registration.payment_status = Some(PaymentStatus::Rejected);
                registration.status = RegistrationStatus::Cancelled;
            }
        }
        registration.updated_at = Utc::now();
        Ok(Some(registration.clone()))
    }

    async fn cancel(&self, id: i64) -> Result<Option<Registration>> {
        let mut state = self.lock();
        match state.registrations.get_mut(&id) {
            Some(registration)
                if matches!(registration.status, RegistrationStatus::Confirmed | RegistrationStatus::Pending) =>
            {
                registration.status = RegistrationStatus::Cancelled;
                registration.updated_at = Utc::now();
                Ok(Some(registration.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn mark_attended(&self, id: i64, at: DateTime<Utc>, reject_cancelled: bool) -> Result<Option<Registration>> {
        let mut state = self.lock();
        let Some(registration) = state.registrations.get_mut(&id) else {
            return Ok(None);
        };
        if registration.attended_at.is_some() || (reject_cancelled && registration.is_cancelled()) {
            return Ok(None);
        }

        registration.attended_at = Some(at);
        registration.status = RegistrationStatus::Attended;
        registration.updated_at = at;
        Ok(Some(registration.clone()))
    }

    async fn replace_payment_proof(&self, id: i64, proof: &str, limit: Option<i32>) -> Result<ProofOutcome> {
        let mut state = self.lock();
        let (event_id, reopens) = match state.registrations.get(&id) {
            Some(r) if r.payment_status != Some(PaymentStatus::Approved) => {
                (r.event_id, r.payment_status == Some(PaymentStatus::Rejected) && r.is_cancelled())
            }
            _ => return Ok(ProofOutcome::Unchanged),
        };

        if reopens {
            if let Some(limit) = limit {
                let active = state
                    .registrations
                    .values()
                    .filter(|r| r.event_id == event_id && !r.is_cancelled())
                    .count() as i64;
                if active >= i64::from(limit) {
                    return Ok(ProofOutcome::CapacityReached);
                }
            }
        }

        let Some(registration) = state.registrations.get_mut(&id) else {
            return Ok(ProofOutcome::Unchanged);
        };
        if reopens {
            registration.status = RegistrationStatus::Pending;
        }
        registration.payment_proof = Some(proof.to_string());
        registration.payment_status = Some(PaymentStatus::Pending);
        registration.updated_at = Utc::now();
        Ok(ProofOutcome::Replaced(registration.clone()))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, request: &CreateUserRequest) -> Result<User> {
        let mut state = self.lock();
        if state.users.values().any(|u| u.email.eq_ignore_ascii_case(&request.email)) {
            return Err(CampusEventsError::AlreadyExists(format!(
                "A user with email {} already exists",
                request.email
            )));
        }

        let id = MemoryState::next_id(&mut state.next_user_id);
        let now = Utc::now();
        let user = User {
            id,
            email: request.email.clone(),
            role: request.role,
            first_name: request.first_name.clone(),
            last_name: request.last_name.clone(),
            organizer_name: request.organizer_name.clone(),
            category: request.category.clone(),
            description: request.description.clone(),
            disabled: false,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        Ok(self.lock().users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let state = self.lock();
        Ok(state.users.values().find(|u| u.email.eq_ignore_ascii_case(email)).cloned())
    }

    async fn list_by_role(&self, role: UserRole) -> Result<Vec<User>> {
        let state = self.lock();
        Ok(state.users.values().rev().filter(|u| u.role == role).cloned().collect())
    }

    async fn exists_with_role(&self, role: UserRole) -> Result<bool> {
        Ok(self.lock().users.values().any(|u| u.role == role))
    }

    async fn set_disabled(&self, id: i64, disabled: bool) -> Result<Option<User>> {
        let mut state = self.lock();
        let Some(user) = state.users.get_mut(&id) else {
            return Ok(None);
        };
        user.disabled = disabled;
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn delete_organizer_cascade(&self, id: i64) -> Result<CascadeSummary> {
        let mut state = self.lock();
        if !state.users.get(&id).is_some_and(|u| u.role == UserRole::Organizer) {
            return Err(CampusEventsError::not_found("Organizer", id));
        }

        let event_ids: Vec<i64> = state
            .events
            .values()
            .filter(|e| e.organizer_id == id)
            .map(|e| e.id)
            .collect();

        let before = state.registrations.len();
        state.registrations.retain(|_, r| !event_ids.contains(&r.event_id));
        let registrations_deleted = (before - state.registrations.len()) as u64;

        for event_id in &event_ids {
            state.events.remove(event_id);
        }
        state.users.remove(&id);

        Ok(CascadeSummary {
            events_deleted: event_ids.len() as u64,
            registrations_deleted,
        })
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
