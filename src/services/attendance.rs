//! Ticket scanning and attendance
//!
//! Check-in is a single conditional update on "not yet attended", so two
//! scanners racing on the same ticket produce exactly one success.

use chrono::Utc;
use tracing::{info, instrument};

use crate::database::DatabaseService;
use crate::models::{
    AttendanceDashboard, AttendanceEntry, Caller, Registration, RegistrationStatus, ScanReceipt,
};
use crate::services::admission::participant_info;
use crate::services::events::EventService;
use crate::utils::errors::{CampusEventsError, Result};
use crate::utils::logging::log_registration_action;

#[derive(Clone)]
pub struct AttendanceService {
    db: DatabaseService,
    events: EventService,
}

impl AttendanceService {
    pub fn new(db: DatabaseService, events: EventService) -> Self {
        Self { db, events }
    }

    /// Check a participant in by ticket identifier
    #[instrument(skip(self), fields(organizer_id = caller.user_id))]
    pub async fn scan_ticket(&self, caller: &Caller, ticket_id: &str) -> Result<ScanReceipt> {
        let ticket_id = ticket_id.trim();
        if ticket_id.is_empty() {
            return Err(CampusEventsError::InvalidInput("Ticket number required".to_string()));
        }

        let registration = self
            .db
            .registrations
            .find_by_ticket(ticket_id)
            .await?
            .ok_or_else(|| CampusEventsError::not_found("Ticket", ticket_id))?;
        self.events.owned_event(caller, registration.event_id).await?;

        if registration.is_cancelled() {
            return Err(CampusEventsError::InvalidTransition("This registration is cancelled".to_string()));
        }
        if let Some(attended_at) = registration.attended_at {
            return Err(CampusEventsError::DuplicateScan { attended_at });
        }

        let attended = self.check_in(&registration, true).await?;
        let participant = participant_info(
            attended.participant_id,
            self.db.users.find_by_id(attended.participant_id).await?.as_ref(),
        );
        let attended_at = attended.attended_at.unwrap_or_else(Utc::now);

        info!(registration_id = attended.id, ticket_id = ticket_id, "Ticket scanned");
        log_registration_action(attended.id, attended.event_id, "scanned", caller.user_id);

        Ok(ScanReceipt {
            registration_id: attended.id,
            event_id: attended.event_id,
            ticket_id: ticket_id.to_string(),
            participant,
            attended_at,
        })
    }

    /// Mark attendance by registration id, for participants without their ticket
    #[instrument(skip(self), fields(organizer_id = caller.user_id))]
    pub async fn mark_attended_manually(&self, caller: &Caller, registration_id: i64) -> Result<Registration> {
        let registration = self
            .db
            .registrations
            .find_by_id(registration_id)
            .await?
            .ok_or_else(|| CampusEventsError::not_found("Registration", registration_id))?;
        self.events.owned_event(caller, registration.event_id).await?;

        if let Some(attended_at) = registration.attended_at {
            return Err(CampusEventsError::DuplicateScan { attended_at });
        }

        let attended = self.check_in(&registration, false).await?;
        log_registration_action(attended.id, attended.event_id, "attendance_manual", caller.user_id);
        Ok(attended)
    }

    /// Confirmed and attended registrations of an owned event, split by check-in
    pub async fn dashboard(&self, caller: &Caller, event_id: i64) -> Result<AttendanceDashboard> {
        self.events.owned_event(caller, event_id).await?;
        let registrations = self.db.registrations.list_for_event(event_id).await?;

        let mut attended = Vec::new();
        let mut not_attended = Vec::new();
        for registration in registrations
            .into_iter()
            .filter(|r| matches!(r.status, RegistrationStatus::Confirmed | RegistrationStatus::Attended))
        {
            let user = self.db.users.find_by_id(registration.participant_id).await?;
            let entry = AttendanceEntry {
                registration_id: registration.id,
                participant: participant_info(registration.participant_id, user.as_ref()),
                ticket_id: registration.ticket_id.clone(),
                attended_at: registration.attended_at,
            };
            if registration.attended_at.is_some() {
                attended.push(entry);
            } else {
                not_attended.push(entry);
            }
        }

        Ok(AttendanceDashboard {
            event_id,
            total: attended.len() + not_attended.len(),
            attended_count: attended.len(),
            not_attended_count: not_attended.len(),
            attended,
            not_attended,
        })
    }

    /// Atomic check-in; on a lost race, report why using the stored row
    async fn check_in(&self, registration: &Registration, reject_cancelled: bool) -> Result<Registration> {
        if let Some(attended) = self
            .db
            .registrations
            .mark_attended(registration.id, Utc::now(), reject_cancelled)
            .await?
        {
            return Ok(attended);
        }

        let current = self
            .db
            .registrations
            .find_by_id(registration.id)
            .await?
            .ok_or_else(|| CampusEventsError::not_found("Registration", registration.id))?;
        match current.attended_at {
            Some(attended_at) => Err(CampusEventsError::DuplicateScan { attended_at }),
            None => Err(CampusEventsError::InvalidTransition("This registration is cancelled".to_string())),
        }
    }
}
