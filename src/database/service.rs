//! Database service layer
//!
//! Bundles the three stores behind trait objects so services do not care
//! whether they run against PostgreSQL or the in-process store.

use std::sync::Arc;

use crate::config::settings::DatabaseConfig;
use crate::database::memory::MemoryStore;
use crate::database::store::{EventStore, RegistrationStore, UserStore};
use crate::database::{create_pool, run_migrations, DatabasePool, EventRepository, RegistrationRepository, UserRepository};
use crate::utils::errors::Result;

#[derive(Clone)]
pub struct DatabaseService {
    pub events: Arc<dyn EventStore>,
    pub registrations: Arc<dyn RegistrationStore>,
    pub users: Arc<dyn UserStore>,
}

impl DatabaseService {
    pub fn postgres(pool: DatabasePool) -> Self {
        Self {
            events: Arc::new(EventRepository::new(pool.clone())),
            registrations: Arc::new(RegistrationRepository::new(pool.clone())),
            users: Arc::new(UserRepository::new(pool)),
        }
    }

    pub fn in_memory() -> Self {
        Self::from_memory(Arc::new(MemoryStore::new()))
    }

    /// Share one in-process store across all three roles
    pub fn from_memory(store: Arc<MemoryStore>) -> Self {
        Self {
            events: store.clone(),
            registrations: store.clone(),
            users: store,
        }
    }

    /// Open the store selected by the configured URL, migrating PostgreSQL if enabled
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        if config.is_in_memory() {
            tracing::warn!("Using in-memory store; data will not survive a restart");
            return Ok(Self::in_memory());
        }

        let pool = create_pool(config).await?;
        if config.run_migrations {
            run_migrations(&pool).await?;
        }
        Ok(Self::postgres(pool))
    }

    pub async fn health_check(&self) -> Result<()> {
        self.users.health_check().await
    }
}

impl std::fmt::Debug for DatabaseService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseService").finish_non_exhaustive()
    }
}
