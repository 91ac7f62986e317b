//! Event service
//!
//! Owns event creation, reads with lazy status promotion, and the
//! status-dependent update policy from [`crate::services::lifecycle`].

use chrono::Utc;
use futures::future::try_join_all;
use tracing::{debug, info, instrument};

use crate::database::DatabaseService;
use crate::models::{
    Caller, CreateEventRequest, Event, EventDetails, EventStatus, PublishedEventFilter, UpdateEventRequest,
    UserRole,
};
use crate::services::lifecycle::{ensure_publishable, plan_update, promoted_status, validate_new_event};
use crate::utils::errors::{CampusEventsError, Result};
use crate::utils::logging::log_event_action;

#[derive(Clone)]
pub struct EventService {
    db: DatabaseService,
}

impl EventService {
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    /// Create a Draft event owned by the calling organizer
    #[instrument(skip(self, request), fields(organizer_id = caller.user_id))]
    pub async fn create_event(&self, caller: &Caller, request: CreateEventRequest) -> Result<Event> {
        self.require_active_organizer(caller).await?;
        validate_new_event(&request)?;

        let event = self.db.events.create(caller.user_id, &request).await?;
        log_event_action(event.id, "create", caller.user_id, Some(event.kind.as_str()));
        Ok(event)
    }

    /// Single event with its registration count. Drafts are visible to their owner only.
    pub async fn get_event(&self, caller: &Caller, id: i64) -> Result<EventDetails> {
        let event = self.find_event(id).await?;
        if event.status == EventStatus::Draft && !event.is_owned_by(caller.user_id) && caller.role != UserRole::Admin {
            return Err(CampusEventsError::not_found("Event", id));
        }

        let mut event = self.refresh_status(event).await?;
        event.form = event.sorted_form();
        let registration_count = self.db.registrations.count_for_event(id).await?;

        Ok(EventDetails { event, registration_count })
    }

    /// Published events matching `filter`, promoted to their current status
    pub async fn list_published(&self, filter: &PublishedEventFilter) -> Result<Vec<Event>> {
        let events = self.db.events.list_published(filter).await?;
        try_join_all(events.into_iter().map(|event| self.refresh_status(event))).await
    }

    /// All events of the calling organizer, newest first
    pub async fn list_organizer_events(&self, caller: &Caller) -> Result<Vec<Event>> {
        caller.require_role(UserRole::Organizer)?;
        let events = self.db.events.list_by_organizer(caller.user_id).await?;
        try_join_all(events.into_iter().map(|event| self.refresh_status(event))).await
    }

    /// Apply the part of `request` the event's current status permits
    #[instrument(skip(self, request), fields(organizer_id = caller.user_id))]
    pub async fn update_event(&self, caller: &Caller, id: i64, request: UpdateEventRequest) -> Result<Event> {
        self.require_active_organizer(caller).await?;
        let event = self.owned_event(caller, id).await?;
        let event = self.refresh_status(event).await?;

        let registration_count = match event.status {
            EventStatus::Draft => self.db.registrations.count_for_event(id).await?,
            _ => 0,
        };
        let plan = plan_update(&event, request, registration_count)?;
        if !plan.dropped.is_empty() {
            debug!(event_id = id, status = %event.status, dropped = ?plan.dropped, "Ignoring fields not editable in current status");
        }

        let updated = self
            .db
            .events
            .update(id, &plan.changes)
            .await?
            .ok_or_else(|| CampusEventsError::not_found("Event", id))?;

        if updated.status != event.status {
            info!(event_id = id, from = %event.status, to = %updated.status, "Event status changed by organizer");
        }
        log_event_action(id, "update", caller.user_id, None);
        Ok(updated)
    }

    /// Move a Draft event to Published
    pub async fn publish_event(&self, caller: &Caller, id: i64) -> Result<Event> {
        self.require_active_organizer(caller).await?;
        let event = self.owned_event(caller, id).await?;
        ensure_publishable(&event)?;

        let published = self
            .db
            .events
            .update_status_if(id, EventStatus::Draft, EventStatus::Published)
            .await?
            .ok_or_else(|| CampusEventsError::InvalidTransition("Event is no longer a Draft".to_string()))?;

        log_event_action(id, "publish", caller.user_id, None);
        Ok(published)
    }

    /// Delete a single event. Its registrations are left in place.
    pub async fn delete_event(&self, caller: &Caller, id: i64) -> Result<()> {
        self.require_active_organizer(caller).await?;
        self.owned_event(caller, id).await?;

        if !self.db.events.delete(id).await? {
            return Err(CampusEventsError::not_found("Event", id));
        }
        log_event_action(id, "delete", caller.user_id, None);
        Ok(())
    }

    /// Persist any time-based promotion that is due and return the current event
    pub async fn refresh_status(&self, event: Event) -> Result<Event> {
        let Some(next) = promoted_status(&event, Utc::now()) else {
            return Ok(event);
        };

        match self.db.events.update_status_if(event.id, event.status, next).await? {
            Some(promoted) => {
                info!(event_id = event.id, from = %event.status, to = %next, "Event status promoted");
                Ok(promoted)
            }
            // Someone else moved it first; report what is stored now
            None => self.find_event(event.id).await,
        }
    }

    pub async fn find_event(&self, id: i64) -> Result<Event> {
        self.db
            .events
            .find_by_id(id)
            .await?
            .ok_or_else(|| CampusEventsError::not_found("Event", id))
    }

    /// Fetch an event the calling organizer owns
    pub async fn owned_event(&self, caller: &Caller, id: i64) -> Result<Event> {
        caller.require_role(UserRole::Organizer)?;
        let event = self.find_event(id).await?;
        if !event.is_owned_by(caller.user_id) {
            return Err(CampusEventsError::Forbidden("Not the event organizer".to_string()));
        }
        Ok(event)
    }

    /// Organizer role, and the account must not be disabled
    pub async fn require_active_organizer(&self, caller: &Caller) -> Result<()> {
        caller.require_role(UserRole::Organizer)?;
        if let Some(user) = self.db.users.find_by_id(caller.user_id).await? {
            if user.disabled {
                return Err(CampusEventsError::Forbidden("Organizer account is disabled".to_string()));
            }
        }
        Ok(())
    }
}
