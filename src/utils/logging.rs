//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the CampusEvents application.

use tracing::{info, warn, error};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};
use crate::config::LoggingConfig;
use crate::utils::errors::{CampusEventsError, Result};

/// Initialize logging based on configuration
///
/// The returned guard must be held for the lifetime of the process, otherwise
/// buffered file output is lost.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = tracing_subscriber::EnvFilter::try_new(&config.level)
        .map_err(|e| CampusEventsError::Config(format!("Invalid log filter: {}", e)))?;

    let stdout_layer = if config.json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().with_writer(std::io::stdout).boxed()
    };

    let (file_layer, guard) = match config.file_path {
        Some(ref directory) => {
            let file_appender = tracing_appender::rolling::daily(directory, "campus-events.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| CampusEventsError::Config(format!("Logging already initialized: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log event management actions
pub fn log_event_action(event_id: i64, action: &str, user_id: i64, details: Option<&str>) {
    info!(
        event_id = event_id,
        action = action,
        user_id = user_id,
        details = details,
        "Event action performed"
    );
}

/// Log registration state changes
pub fn log_registration_action(registration_id: i64, event_id: i64, action: &str, user_id: i64) {
    info!(
        registration_id = registration_id,
        event_id = event_id,
        action = action,
        user_id = user_id,
        "Registration action performed"
    );
}

/// Log stock movements on merchandise events
pub fn log_stock_change(event_id: i64, registration_id: i64, delta: i32, remaining: i32) {
    info!(
        event_id = event_id,
        registration_id = registration_id,
        delta = delta,
        remaining = remaining,
        "Merchandise stock adjusted"
    );
}

/// Log admin actions
pub fn log_admin_action(admin_id: i64, action: &str, target: Option<&str>, details: Option<&str>) {
    warn!(
        admin_id = admin_id,
        action = action,
        target = target,
        details = details,
        "Admin action performed"
    );
}

/// Log a state that needs manual reconciliation
pub fn log_inconsistency(operation: &str, event_id: i64, registration_id: i64, error: &str) {
    error!(
        operation = operation,
        event_id = event_id,
        registration_id = registration_id,
        error = error,
        "Inconsistent state detected, manual reconciliation required"
    );
}
