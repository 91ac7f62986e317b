//! HTTP adapter
//!
//! Thin axum handlers over [`ServiceFactory`]. Every route except `/health`
//! and the published-event listing requires the caller identity headers.
//! Mutating routes go through the per-caller rate limiter when it is enabled.

pub mod admin;
pub mod error;
pub mod events;
pub mod health;
pub mod registrations;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::settings::Settings;
use crate::middleware::{log_requests, rate_limit, CallerRateLimiter};
use crate::services::ServiceFactory;

pub use error::ApiError;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub services: ServiceFactory,
    pub rate_limiter: Option<Arc<CallerRateLimiter>>,
}

impl AppState {
    pub fn new(settings: &Settings, services: ServiceFactory) -> Self {
        Self {
            services,
            rate_limiter: CallerRateLimiter::from_config(&settings.rate_limit),
        }
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let reads = Router::new()
        .route("/events", get(events::list_published))
        .route("/events/mine", get(events::list_mine))
        .route("/events/:id", get(events::get_event))
        .route("/events/:id/registrations", get(registrations::event_registrations))
        .route("/events/:id/attendance", get(registrations::attendance_dashboard))
        .route("/registrations", get(registrations::history))
        .route("/analytics", get(registrations::analytics))
        .route("/admin/organizers", get(admin::list_organizers));

    let mut writes = Router::new()
        .route("/events", post(events::create_event))
        .route("/events/:id", put(events::update_event).delete(events::delete_event))
        .route("/events/:id/publish", post(events::publish_event))
        .route("/registrations", post(registrations::register))
        .route("/registrations/:id/payment-proof", put(registrations::upload_payment_proof))
        .route("/registrations/:id/approve", post(registrations::approve))
        .route("/registrations/:id/reject", post(registrations::reject))
        .route("/registrations/:id/cancel", post(registrations::cancel))
        .route("/registrations/:id/attendance", post(registrations::mark_attended))
        .route("/attendance/scan", post(registrations::scan))
        .route("/admin/organizers", post(admin::create_organizer))
        .route("/admin/organizers/:id", delete(admin::remove_organizer));

    if let Some(limiter) = state.rate_limiter.clone() {
        writes = writes.route_layer(middleware::from_fn_with_state(limiter, rate_limit));
    }

    Router::new()
        .route("/health", get(health::health))
        .nest("/api", reads.merge(writes))
        .with_state(state)
        .layer(middleware::from_fn(log_requests))
        .layer(TraceLayer::new_for_http())
}
