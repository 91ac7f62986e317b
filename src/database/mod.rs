//! Database module
//!
//! Storage traits, their PostgreSQL and in-process implementations, and the
//! service bundle handed to the business layer.

pub mod connection;
pub mod memory;
pub mod repositories;
pub mod service;
pub mod store;

pub use connection::{create_pool, run_migrations, DatabasePool};
pub use memory::MemoryStore;
pub use repositories::{EventRepository, RegistrationRepository, UserRepository};
pub use service::DatabaseService;
pub use store::{EventStore, RegistrationStore, UserStore};
