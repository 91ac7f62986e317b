//! Test context for unified test setup
//!
//! Wires the full service stack over a [`MemoryStore`] and records every
//! ticket email instead of sending it.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use chrono::{Duration, Utc};

use CampusEvents::{
    config::Settings,
    database::{store::UserStore, DatabaseService, MemoryStore},
    handlers::{router, AppState},
    models::{Caller, CreateEventRequest, CreateUserRequest, Event, EventStatus, User, UserRole},
    services::{ServiceFactory, TicketEmail, TicketMailer},
    utils::errors::{CampusEventsError, Result},
};

/// Mailer that keeps every message in memory
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<(String, TicketEmail)>>,
    fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self { sent: Mutex::new(Vec::new()), fail: true }
    }

    pub fn sent(&self) -> Vec<(String, TicketEmail)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl TicketMailer for RecordingMailer {
    async fn send_ticket_email(&self, to: &str, ticket: &TicketEmail) -> Result<()> {
        if self.fail {
            return Err(CampusEventsError::Email("smtp unavailable".to_string()));
        }
        self.sent.lock().unwrap().push((to.to_string(), ticket.clone()));
        Ok(())
    }
}

pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub settings: Settings,
    pub services: ServiceFactory,
    pub mailer: Arc<RecordingMailer>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_mailer(RecordingMailer::default())
    }

    pub fn with_mailer(mailer: RecordingMailer) -> Self {
        let mut settings = Settings::default();
        settings.database.url = "memory://".to_string();
        settings.rate_limit.enabled = false;
        Self::build(settings, mailer)
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self::build(settings, RecordingMailer::default())
    }

    fn build(settings: Settings, mailer: RecordingMailer) -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let store = Arc::new(MemoryStore::new());
        let mailer = Arc::new(mailer);
        let services =
            ServiceFactory::with_mailer(&settings, DatabaseService::from_memory(store.clone()), mailer.clone());

        Self { store, settings, services, mailer }
    }

    /// HTTP router over the same services
    pub fn app(&self) -> Router {
        router(AppState::new(&self.settings, self.services.clone()))
    }

    pub async fn create_user(&self, request: CreateUserRequest) -> User {
        self.store.create(&request).await.expect("create user")
    }

    pub async fn participant(&self, first_name: &str) -> (User, Caller) {
        let user = self
            .create_user(CreateUserRequest {
                email: format!("{}@students.campus.local", first_name.to_lowercase()),
                role: UserRole::Participant,
                first_name: Some(first_name.to_string()),
                last_name: Some("Student".to_string()),
                organizer_name: None,
                category: None,
                description: None,
            })
            .await;
        let caller = Caller::participant(user.id);
        (user, caller)
    }

    pub async fn organizer(&self, name: &str) -> (User, Caller) {
        let user = self
            .create_user(CreateUserRequest {
                email: format!("{}@clubs.campus.local", name.to_lowercase().replace(' ', "-")),
                role: UserRole::Organizer,
                first_name: None,
                last_name: None,
                organizer_name: Some(name.to_string()),
                category: Some("Technical".to_string()),
                description: None,
            })
            .await;
        let caller = Caller::organizer(user.id);
        (user, caller)
    }

    pub async fn admin(&self) -> (User, Caller) {
        let user = self
            .create_user(CreateUserRequest {
                email: "admin@campus.local".to_string(),
                role: UserRole::Admin,
                first_name: Some("Admin".to_string()),
                last_name: None,
                organizer_name: None,
                category: None,
                description: None,
            })
            .await;
        let caller = Caller::admin(user.id);
        (user, caller)
    }

    /// Create and publish an event in one step
    pub async fn published_event(&self, organizer: &Caller, request: CreateEventRequest) -> Event {
        let event = self
            .services
            .event_service
            .create_event(organizer, request)
            .await
            .expect("create event");
        self.services
            .event_service
            .publish_event(organizer, event.id)
            .await
            .expect("publish event")
    }

    /// Rewrite a stored event directly, bypassing lifecycle rules
    pub async fn overwrite_event(&self, event_id: i64, edit: impl FnOnce(&mut Event)) -> Event {
        let mut event = self.services.event_service.find_event(event_id).await.expect("event exists");
        edit(&mut event);
        self.store.put_event(event.clone());
        event
    }

    /// Move an event's deadline into the past while keeping it Published
    pub async fn expire_deadline(&self, event_id: i64) -> Event {
        self.overwrite_event(event_id, |event| {
            event.registration_deadline = Some(Utc::now() - Duration::hours(1));
            event.status = EventStatus::Published;
        })
        .await
    }
}
