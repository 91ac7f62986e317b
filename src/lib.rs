//! CampusEvents
//!
//! Backend core for campus club events: the event lifecycle, admission of
//! registrations and merchandise orders, payment settlement against stock,
//! and ticket check-in at the door.

#![allow(non_snake_case)]

pub mod config;
pub mod database;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{CampusEventsError, Result};

pub use database::{DatabaseService, MemoryStore};
pub use handlers::{router, AppState};
pub use services::ServiceFactory;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
