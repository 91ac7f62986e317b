//! PostgreSQL harness
//!
//! Tests that need a real database read `TEST_DATABASE_URL` and skip when it
//! is unset. Each test starts from empty tables.

use CampusEvents::{
    config::Settings,
    database::{create_pool, run_migrations, DatabasePool, DatabaseService},
};

pub struct TestDatabase {
    pub pool: DatabasePool,
    pub service: DatabaseService,
}

impl TestDatabase {
    /// `None` when no test database is configured
    pub async fn connect() -> Option<Self> {
        let url = std::env::var("TEST_DATABASE_URL").ok()?;

        let mut settings = Settings::default();
        settings.database.url = url;
        settings.database.max_connections = 5;

        let pool = create_pool(&settings.database).await.expect("connect to test database");
        run_migrations(&pool).await.expect("migrate test database");

        let db = Self { service: DatabaseService::postgres(pool.clone()), pool };
        db.truncate().await;
        Some(db)
    }

    pub async fn truncate(&self) {
        sqlx::query("TRUNCATE registrations, events, users RESTART IDENTITY CASCADE")
            .execute(&self.pool)
            .await
            .expect("truncate tables");
    }

    pub async fn count_records(&self, table: &str) -> i64 {
        let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.pool)
            .await
            .expect("count records");
        count
    }
}
