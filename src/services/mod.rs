//! Services module
//!
//! Business rules for events, registrations, settlement and attendance.

pub mod admin;
pub mod admission;
pub mod analytics;
pub mod attendance;
pub mod events;
pub mod lifecycle;
pub mod settlement;
pub mod tickets;

pub use admin::{AdminService, RemovalOutcome};
pub use admission::RegistrationService;
pub use analytics::{AnalyticsService, EventAnalytics, OrganizerAnalytics};
pub use attendance::AttendanceService;
pub use events::EventService;
pub use lifecycle::PlannedUpdate;
pub use settlement::SettlementService;
pub use tickets::{LogMailer, TicketEmail, TicketIssuer, TicketMailer};

use std::sync::Arc;

use crate::config::settings::Settings;
use crate::database::DatabaseService;

/// Service factory for creating and managing all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub database: DatabaseService,
    pub event_service: EventService,
    pub registration_service: RegistrationService,
    pub settlement_service: SettlementService,
    pub attendance_service: AttendanceService,
    pub analytics_service: AnalyticsService,
    pub admin_service: AdminService,
}

impl ServiceFactory {
    /// Wire all services with the log-only mailer from settings
    pub fn new(settings: &Settings, database: DatabaseService) -> Self {
        let mailer: Arc<dyn TicketMailer> = Arc::new(LogMailer::new(&settings.email));
        Self::with_mailer(settings, database, mailer)
    }

    pub fn with_mailer(settings: &Settings, database: DatabaseService, mailer: Arc<dyn TicketMailer>) -> Self {
        let tickets = TicketIssuer::new(&settings.tickets);
        let event_service = EventService::new(database.clone());

        Self {
            registration_service: RegistrationService::new(
                database.clone(),
                event_service.clone(),
                tickets.clone(),
                mailer.clone(),
            ),
            settlement_service: SettlementService::new(database.clone(), event_service.clone(), tickets, mailer),
            attendance_service: AttendanceService::new(database.clone(), event_service.clone()),
            analytics_service: AnalyticsService::new(database.clone()),
            admin_service: AdminService::new(database.clone(), settings.admin.clone()),
            event_service,
            database,
        }
    }

    /// Health check for the backing store
    pub async fn health_check(&self) -> ServiceHealthStatus {
        let store_error = self.database.health_check().await.err().map(|e| e.to_string());
        ServiceHealthStatus {
            store_healthy: store_error.is_none(),
            store_error,
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ServiceHealthStatus {
    pub store_healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_error: Option<String>,
}

impl ServiceHealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.store_healthy
    }
}
