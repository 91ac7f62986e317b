//! User repository implementation

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::info;

use crate::database::store::UserStore;
use crate::models::user::{CascadeSummary, CreateUserRequest, User, UserRole};
use crate::utils::errors::{CampusEventsError, Result};

const USER_COLUMNS: &str = "id, email, role, first_name, last_name, organizer_name, category, \
    description, disabled, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    /// Create a new user
    async fn create(&self, request: &CreateUserRequest) -> Result<User> {
        let sql = format!(
            r#"
            INSERT INTO users (email, role, first_name, last_name, organizer_name, category, description,
                created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            RETURNING {USER_COLUMNS}
            "#
        );
        let created = sqlx::query_as::<_, User>(&sql)
            .bind(&request.email)
            .bind(request.role.as_str())
            .bind(&request.first_name)
            .bind(&request.last_name)
            .bind(&request.organizer_name)
            .bind(&request.category)
            .bind(&request.description)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await;

        match created {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Err(
                CampusEventsError::AlreadyExists(format!("A user with email {} already exists", request.email)),
            ),
            Err(e) => Err(e.into()),
        }
    }

    /// Find user by ID
    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Find user by email, case-insensitively
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn list_by_role(&self, role: UserRole) -> Result<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE role = $1 ORDER BY created_at DESC, id DESC");
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(role.as_str())
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    async fn exists_with_role(&self, role: UserRole) -> Result<bool> {
        let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE role = $1)")
            .bind(role.as_str())
            .fetch_one(&self.pool)
            .await?;

        Ok(exists.0)
    }

    async fn set_disabled(&self, id: i64, disabled: bool) -> Result<Option<User>> {
        let sql = format!(
            "UPDATE users SET disabled = $2, updated_at = $3 WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(disabled)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn delete_organizer_cascade(&self, id: i64) -> Result<CascadeSummary> {
        let mut tx = self.pool.begin().await?;

        let registrations = sqlx::query(
            "DELETE FROM registrations WHERE event_id IN (SELECT id FROM events WHERE organizer_id = $1)"
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let events = sqlx::query("DELETE FROM events WHERE organizer_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let user = sqlx::query("DELETE FROM users WHERE id = $1 AND role = 'Organizer'")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if user.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(CampusEventsError::not_found("Organizer", id));
        }

        tx.commit().await?;

        let summary = CascadeSummary {
            events_deleted: events.rows_affected(),
            registrations_deleted: registrations.rows_affected(),
        };
        info!(organizer_id = id, events = summary.events_deleted, registrations = summary.registrations_deleted, "Organizer deleted with cascade");
        Ok(summary)
    }

    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
