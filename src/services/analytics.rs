//! Organizer analytics

use serde::Serialize;

use crate::database::DatabaseService;
use crate::models::{Caller, Event, EventKind, EventStatus, PaymentStatus, Registration, RegistrationStatus, UserRole};
use crate::utils::errors::Result;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventAnalytics {
    pub event_id: i64,
    pub name: String,
    pub kind: EventKind,
    pub status: EventStatus,
    /// Non-cancelled registrations
    pub registrations: usize,
    pub attended: usize,
    pub cancelled: usize,
    pub pending_payments: usize,
    pub revenue: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrganizerAnalytics {
    pub total_registrations: usize,
    pub total_attendance: usize,
    pub total_revenue: i64,
    pub events: Vec<EventAnalytics>,
}

#[derive(Clone)]
pub struct AnalyticsService {
    db: DatabaseService,
}

impl AnalyticsService {
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    pub async fn organizer_analytics(&self, caller: &Caller) -> Result<OrganizerAnalytics> {
        caller.require_role(UserRole::Organizer)?;

        let events = self.db.events.list_by_organizer(caller.user_id).await?;
        let ids: Vec<i64> = events.iter().map(|e| e.id).collect();
        let registrations = if ids.is_empty() {
            Vec::new()
        } else {
            self.db.registrations.list_for_events(&ids).await?
        };

        Ok(summarize(&events, &registrations))
    }
}

/// Per-event counts and revenue. Revenue counts every non-cancelled
/// registration at the event fee.
pub fn summarize(events: &[Event], registrations: &[Registration]) -> OrganizerAnalytics {
    let per_event: Vec<EventAnalytics> = events
        .iter()
        .map(|event| {
            let mine: Vec<&Registration> = registrations.iter().filter(|r| r.event_id == event.id).collect();
            let active = mine.iter().filter(|r| !r.is_cancelled()).count();

            EventAnalytics {
                event_id: event.id,
                name: event.name.clone(),
                kind: event.kind,
                status: event.status,
                registrations: active,
                attended: mine.iter().filter(|r| r.status == RegistrationStatus::Attended).count(),
                cancelled: mine.len() - active,
                pending_payments: mine
                    .iter()
                    .filter(|r| r.payment_status == Some(PaymentStatus::Pending))
                    .count(),
                revenue: active as i64 * i64::from(event.registration_fee.unwrap_or(0)),
            }
        })
        .collect();

    let owned_registrations = registrations
        .iter()
        .filter(|r| events.iter().any(|e| e.id == r.event_id));

    OrganizerAnalytics {
        total_registrations: owned_registrations.clone().count(),
        total_attendance: owned_registrations
            .filter(|r| r.status == RegistrationStatus::Attended)
            .count(),
        total_revenue: per_event.iter().map(|e| e.revenue).sum(),
        events: per_event,
    }
}
