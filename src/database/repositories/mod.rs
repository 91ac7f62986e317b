//! PostgreSQL repositories
//!
//! One repository per table, each implementing the matching store trait.

pub mod user;
pub mod event;
pub mod registration;

pub use user::UserRepository;
pub use event::EventRepository;
pub use registration::RegistrationRepository;
