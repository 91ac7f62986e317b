//! Error handling for CampusEvents
//!
//! This module defines the main error type used throughout the application.
//! Validation failures are typed variants so callers can present them precisely;
//! storage failures stay wrapped and are treated as internal errors.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Main error type for CampusEvents
#[derive(Error, Debug)]
pub enum CampusEventsError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("Registration deadline has passed")]
    DeadlinePassed,

    #[error("Already registered for this event")]
    AlreadyRegistered,

    #[error("Registration limit reached")]
    CapacityReached,

    #[error("Out of stock: requested {requested}, available {available}")]
    OutOfStock { requested: i32, available: i32 },

    #[error("Purchase limit exceeded: requested {requested}, limit {limit}")]
    PurchaseLimitExceeded { requested: i32, limit: i32 },

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Order already settled (payment status: {0})")]
    AlreadySettled(String),

    #[error("Duplicate scan - already attended at {attended_at}")]
    DuplicateScan { attended_at: DateTime<Utc> },

    #[error("Inconsistent state, manual reconciliation required: {0}")]
    InconsistentState(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Email delivery error: {0}")]
    Email(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for CampusEvents operations
pub type Result<T> = std::result::Result<T, CampusEventsError>;

impl CampusEventsError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        CampusEventsError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Stable machine-readable code, used by the HTTP adapter and in logs
    pub fn code(&self) -> &'static str {
        match self {
            CampusEventsError::Database(_) => "INTERNAL_ERROR",
            CampusEventsError::Migration(_) => "INTERNAL_ERROR",
            CampusEventsError::Config(_) => "CONFIG_ERROR",
            CampusEventsError::NotFound { .. } => "NOT_FOUND",
            CampusEventsError::Forbidden(_) => "FORBIDDEN",
            CampusEventsError::DeadlinePassed => "DEADLINE_PASSED",
            CampusEventsError::AlreadyRegistered => "ALREADY_REGISTERED",
            CampusEventsError::CapacityReached => "CAPACITY_REACHED",
            CampusEventsError::OutOfStock { .. } => "OUT_OF_STOCK",
            CampusEventsError::PurchaseLimitExceeded { .. } => "PURCHASE_LIMIT_EXCEEDED",
            CampusEventsError::InvalidTransition(_) => "INVALID_TRANSITION",
            CampusEventsError::AlreadySettled(_) => "ALREADY_SETTLED",
            CampusEventsError::DuplicateScan { .. } => "DUPLICATE_SCAN",
            CampusEventsError::InconsistentState(_) => "INCONSISTENT_STATE",
            CampusEventsError::AlreadyExists(_) => "ALREADY_EXISTS",
            CampusEventsError::InvalidInput(_) => "INVALID_INPUT",
            CampusEventsError::Authentication(_) => "UNAUTHORIZED",
            CampusEventsError::RateLimitExceeded => "RATE_LIMITED",
            CampusEventsError::Email(_) => "EMAIL_ERROR",
            CampusEventsError::Serialization(_) => "INTERNAL_ERROR",
            CampusEventsError::Io(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the error is an internal failure rather than an outcome of
    /// validating the caller's request
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            CampusEventsError::Database(_)
                | CampusEventsError::Migration(_)
                | CampusEventsError::Config(_)
                | CampusEventsError::InconsistentState(_)
                | CampusEventsError::Email(_)
                | CampusEventsError::Serialization(_)
                | CampusEventsError::Io(_)
        )
    }

    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            CampusEventsError::Database(_) => false,
            CampusEventsError::Migration(_) => false,
            CampusEventsError::Config(_) => false,
            CampusEventsError::InconsistentState(_) => false,
            CampusEventsError::Email(_) => true,
            CampusEventsError::Io(_) => true,
            CampusEventsError::RateLimitExceeded => true,
            _ => false,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CampusEventsError::Database(_) => ErrorSeverity::Critical,
            CampusEventsError::Migration(_) => ErrorSeverity::Critical,
            CampusEventsError::Config(_) => ErrorSeverity::Critical,
            CampusEventsError::InconsistentState(_) => ErrorSeverity::Critical,
            CampusEventsError::Forbidden(_) => ErrorSeverity::Warning,
            CampusEventsError::Authentication(_) => ErrorSeverity::Warning,
            CampusEventsError::RateLimitExceeded => ErrorSeverity::Warning,
            CampusEventsError::Email(_) => ErrorSeverity::Error,
            CampusEventsError::Serialization(_) => ErrorSeverity::Error,
            CampusEventsError::Io(_) => ErrorSeverity::Error,
            _ => ErrorSeverity::Info,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
