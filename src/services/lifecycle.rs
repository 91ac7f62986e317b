//! Event lifecycle policy
//!
//! Pure decisions about event status and which parts of an update request may
//! be applied. `EventService` wraps these with storage access.
//!
//! ```text
//! Draft -> Published -> Ongoing <-> Closed
//!              \___________________^
//! ```

use chrono::{DateTime, Utc};

use crate::models::event::{CreateEventRequest, Event, EventKind, EventStatus, UpdateEventRequest};
use crate::utils::errors::{CampusEventsError, Result};

/// Update request reduced to what the current status permits
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedUpdate {
    pub changes: UpdateEventRequest,
    /// Fields present in the request that were silently left out
    pub dropped: Vec<&'static str>,
}

/// Status an event should move to at `now`, if it is due for promotion
pub fn promoted_status(event: &Event, now: DateTime<Utc>) -> Option<EventStatus> {
    let ended = event.event_end.is_some_and(|end| now >= end);
    let started = event.event_start.is_some_and(|start| now >= start);

    match event.status {
        EventStatus::Published | EventStatus::Ongoing if ended => Some(EventStatus::Closed),
        EventStatus::Published if started => Some(EventStatus::Ongoing),
        _ => None,
    }
}

/// Publishing is only legal from Draft
pub fn ensure_publishable(event: &Event) -> Result<()> {
    match event.status {
        EventStatus::Draft => Ok(()),
        status => Err(CampusEventsError::InvalidTransition(format!(
            "Only Draft events can be published (current status: {})",
            status
        ))),
    }
}

/// Validate a creation request before anything is stored
pub fn validate_new_event(request: &CreateEventRequest) -> Result<()> {
    if request.name.trim().is_empty() {
        return Err(CampusEventsError::InvalidInput("Event name is required".to_string()));
    }
    validate_schedule(request.registration_deadline, request.event_start, request.event_end)?;
    validate_numbers(
        request.registration_limit,
        request.registration_fee,
        request.quantity,
        request.purchase_limit,
    )?;

    if request.kind == EventKind::Merchandise && request.quantity.is_none() {
        return Err(CampusEventsError::InvalidInput(
            "Merchandise events need an initial stock quantity".to_string(),
        ));
    }
    Ok(())
}

/// Reduce an update request to the subset the event's status allows.
///
/// Draft drops a form edit once registrations exist, Published silently
/// ignores fields outside its small allow-list, and Ongoing/Closed reject the
/// whole request if anything but `status` is present.
pub fn plan_update(event: &Event, request: UpdateEventRequest, registration_count: i64) -> Result<PlannedUpdate> {
    match event.status {
        EventStatus::Draft => plan_draft_update(event, request, registration_count),
        EventStatus::Published => plan_published_update(event, request),
        EventStatus::Ongoing | EventStatus::Closed => plan_running_update(request),
    }
}

fn plan_draft_update(event: &Event, mut request: UpdateEventRequest, registration_count: i64) -> Result<PlannedUpdate> {
    if let Some(status) = request.status {
        if !matches!(status, EventStatus::Draft | EventStatus::Published) {
            return Err(CampusEventsError::InvalidTransition(format!(
                "A Draft event cannot move to {}",
                status
            )));
        }
    }

    let mut dropped = Vec::new();
    if request.form.is_some() && registration_count > 0 {
        request.form = None;
        dropped.push("form");
    }

    validate_schedule(
        request.registration_deadline.or(event.registration_deadline),
        request.event_start.or(event.event_start),
        request.event_end.or(event.event_end),
    )?;
    validate_numbers(
        request.registration_limit,
        request.registration_fee,
        request.quantity,
        request.purchase_limit,
    )?;
    if request.kind.unwrap_or(event.kind) == EventKind::Merchandise
        && request.quantity.or(event.quantity).is_none()
    {
        return Err(CampusEventsError::InvalidInput(
            "Merchandise events need a stock quantity".to_string(),
        ));
    }

    Ok(PlannedUpdate { changes: request, dropped })
}

fn plan_published_update(event: &Event, request: UpdateEventRequest) -> Result<PlannedUpdate> {
    let mut changes = UpdateEventRequest::default();
    let mut dropped = Vec::new();

    for field in request.present_fields() {
        match field {
            "description" => changes.description = request.description.clone(),
            // Extending only; an unset deadline or limit is already unbounded
            "registration_deadline" => match (request.registration_deadline, event.registration_deadline) {
                (Some(new), Some(old)) if new >= old => changes.registration_deadline = Some(new),
                _ => dropped.push(field),
            },
            "registration_limit" => match (request.registration_limit, event.registration_limit) {
                (Some(new), Some(old)) if new >= old => changes.registration_limit = Some(new),
                _ => dropped.push(field),
            },
            other => dropped.push(other),
        }
    }

    match request.status {
        Some(EventStatus::Closed) => changes.status = Some(EventStatus::Closed),
        Some(_) => dropped.push("status"),
        None => {}
    }

    if changes.is_empty() {
        return Err(CampusEventsError::InvalidTransition(
            "No valid updates for a published event".to_string(),
        ));
    }
    Ok(PlannedUpdate { changes, dropped })
}

fn plan_running_update(request: UpdateEventRequest) -> Result<PlannedUpdate> {
    let extra = request.present_fields();
    if !extra.is_empty() {
        return Err(CampusEventsError::InvalidTransition(format!(
            "Ongoing/Closed events can only change status (rejected fields: {})",
            extra.join(", ")
        )));
    }

    match request.status {
        Some(status @ (EventStatus::Ongoing | EventStatus::Closed)) => Ok(PlannedUpdate {
            changes: UpdateEventRequest { status: Some(status), ..Default::default() },
            dropped: Vec::new(),
        }),
        Some(status) => Err(CampusEventsError::InvalidTransition(format!(
            "Ongoing/Closed events cannot move back to {}",
            status
        ))),
        None => Err(CampusEventsError::InvalidTransition(
            "Ongoing/Closed events can only change status".to_string(),
        )),
    }
}

/// Registration deadline, start and end must be in non-decreasing order when present
pub fn validate_schedule(
    deadline: Option<DateTime<Utc>>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Result<()> {
    if let (Some(deadline), Some(start)) = (deadline, start) {
        if deadline > start {
            return Err(CampusEventsError::InvalidInput(
                "Registration deadline must not be after the event start".to_string(),
            ));
        }
    }
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(CampusEventsError::InvalidInput("Event start must not be after its end".to_string()));
        }
    }
    if let (Some(deadline), Some(end)) = (deadline, end) {
        if deadline > end {
            return Err(CampusEventsError::InvalidInput(
                "Registration deadline must not be after the event end".to_string(),
            ));
        }
    }
    Ok(())
}

fn validate_numbers(
    registration_limit: Option<i32>,
    registration_fee: Option<i32>,
    quantity: Option<i32>,
    purchase_limit: Option<i32>,
) -> Result<()> {
    let negative = [
        ("registration_limit", registration_limit),
        ("registration_fee", registration_fee),
        ("quantity", quantity),
    ]
    .into_iter()
    .find(|(_, value)| value.is_some_and(|v| v < 0));

    if let Some((field, _)) = negative {
        return Err(CampusEventsError::InvalidInput(format!("{} must not be negative", field)));
    }
    if purchase_limit.is_some_and(|limit| limit < 1) {
        return Err(CampusEventsError::InvalidInput("purchase_limit must be at least 1".to_string()));
    }
    Ok(())
}
