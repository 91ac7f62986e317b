//! Middleware module
//!
//! Caller identity, rate limiting and request logging for the HTTP adapter.

pub mod auth;
pub mod logging;
pub mod rate_limit;

pub use logging::log_requests;
pub use rate_limit::{rate_limit, CallerRateLimiter};
