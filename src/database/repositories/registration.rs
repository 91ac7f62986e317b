//! Registration repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::debug;

use crate::database::store::RegistrationStore;
use crate::models::registration::{InsertOutcome, NewRegistration, PaymentDecision, ProofOutcome, Registration};
use crate::utils::errors::{CampusEventsError, Result};

const REGISTRATION_COLUMNS: &str = "id, event_id, participant_id, status, responses, ticket_id, \
    size, color, variant, quantity, payment_proof, payment_status, attended_at, created_at, updated_at";

const EVENT_PARTICIPANT_KEY: &str = "registrations_event_participant_key";

#[derive(Debug, Clone)]
pub struct RegistrationRepository {
    pool: PgPool,
}

impl RegistrationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Whether the error is the (event, participant) uniqueness constraint firing
fn is_duplicate_registration(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.is_unique_violation() && db_err.constraint() == Some(EVENT_PARTICIPANT_KEY)
        }
        _ => false,
    }
}

#[async_trait]
impl RegistrationStore for RegistrationRepository {
    async fn insert_if_admissible(&self, registration: NewRegistration, limit: Option<i32>) -> Result<InsertOutcome> {
        let mut tx = self.pool.begin().await?;

        // The event row lock serializes admissions per event, which makes the
        // capacity count below exact.
        let locked: Option<(i64,)> = sqlx::query_as("SELECT id FROM events WHERE id = $1 FOR UPDATE")
            .bind(registration.event_id)
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            return Err(CampusEventsError::not_found("Event", registration.event_id));
        }

        let existing: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM registrations WHERE event_id = $1 AND participant_id = $2"
        )
        .bind(registration.event_id)
        .bind(registration.participant_id)
        .fetch_one(&mut *tx)
        .await?;
        if existing.0 > 0 {
            return Ok(InsertOutcome::Duplicate);
        }

        if let Some(limit) = limit {
            let active: (i64,) = sqlx::query_as(
                "SELECT COUNT(*) FROM registrations WHERE event_id = $1 AND status <> 'Cancelled'"
            )
            .bind(registration.event_id)
            .fetch_one(&mut *tx)
            .await?;
            if active.0 >= i64::from(limit) {
                debug!(event_id = registration.event_id, active = active.0, limit = limit, "Registration limit reached");
                return Ok(InsertOutcome::CapacityReached);
            }
        }

        let sql = format!(
            r#"
            INSERT INTO registrations (event_id, participant_id, status, responses, ticket_id, size, color,
                variant, quantity, payment_proof, payment_status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $12)
            RETURNING {REGISTRATION_COLUMNS}
            "#
        );
        let inserted = sqlx::query_as::<_, Registration>(&sql)
            .bind(registration.event_id)
            .bind(registration.participant_id)
            .bind(registration.status.as_str())
            .bind(Json(registration.responses))
            .bind(registration.ticket_id)
            .bind(registration.size)
            .bind(registration.color)
            .bind(registration.variant)
            .bind(registration.quantity)
            .bind(registration.payment_proof)
            .bind(registration.payment_status.map(|s| s.as_str()))
            .bind(Utc::now())
            .fetch_one(&mut *tx)
            .await;

        match inserted {
            Ok(row) => {
                tx.commit().await?;
                Ok(InsertOutcome::Inserted(row))
            }
            Err(e) if is_duplicate_registration(&e) => Ok(InsertOutcome::Duplicate),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Registration>> {
        let sql = format!("SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE id = $1");
        let registration = sqlx::query_as::<_, Registration>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(registration)
    }

    async fn find_by_ticket(&self, ticket_id: &str) -> Result<Option<Registration>> {
        let sql = format!("SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE ticket_id = $1");
        let registration = sqlx::query_as::<_, Registration>(&sql)
            .bind(ticket_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(registration)
    }

    async fn find_for_participant(&self, event_id: i64, participant_id: i64) -> Result<Option<Registration>> {
        let sql = format!(
            "SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE event_id = $1 AND participant_id = $2"
        );
        let registration = sqlx::query_as::<_, Registration>(&sql)
            .bind(event_id)
            .bind(participant_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(registration)
    }

    async fn list_for_event(&self, event_id: i64) -> Result<Vec<Registration>> {
        let sql = format!(
            "SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE event_id = $1 ORDER BY created_at ASC, id ASC"
        );
        let registrations = sqlx::query_as::<_, Registration>(&sql)
            .bind(event_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(registrations)
    }

    async fn list_for_events(&self, event_ids: &[i64]) -> Result<Vec<Registration>> {
        let sql = format!(
            "SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE event_id = ANY($1) ORDER BY created_at ASC, id ASC"
        );
        let registrations = sqlx::query_as::<_, Registration>(&sql)
            .bind(event_ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(registrations)
    }

    async fn list_for_participant(&self, participant_id: i64) -> Result<Vec<Registration>> {
        let sql = format!(
            "SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE participant_id = $1 ORDER BY created_at DESC, id DESC"
        );
        let registrations = sqlx::query_as::<_, Registration>(&sql)
            .bind(participant_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(registrations)
    }

    async fn count_for_event(&self, event_id: i64) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM registrations WHERE event_id = $1")
            .bind(event_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }

    async fn count_active_for_event(&self, event_id: i64) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM registrations WHERE event_id = $1 AND status <> 'Cancelled'"
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    async fn settle_payment(&self, id: i64, decision: &PaymentDecision) -> Result<Option<Registration>> {
        let (payment_status, status, ticket_id) = match decision {
            PaymentDecision::Approve { ticket_id } => ("Approved", "Confirmed", Some(ticket_id.as_str())),
            PaymentDecision::Reject => ("Rejected", "Cancelled", None),
        };

        let sql = format!(
            r#"
            UPDATE registrations
            SET payment_status = $2,
                status = $3,
                ticket_id = COALESCE($4, ticket_id),
                updated_at = $5
            WHERE id = $1 AND payment_status = 'Pending' AND status = 'Pending'
            RETURNING {REGISTRATION_COLUMNS}
            "#
        );
        let registration = sqlx::query_as::<_, Registration>(&sql)
            .bind(id)
            .bind(payment_status)
            .bind(status)
            .bind(ticket_id)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;

        Ok(registration)
    }

    async fn cancel(&self, id: i64) -> Result<Option<Registration>> {
        let sql = format!(
            r#"
            UPDATE registrations
            SET status = 'Cancelled', updated_at = $2
            WHERE id = $1 AND status IN ('Confirmed', 'Pending')
            RETURNING {REGISTRATION_COLUMNS}
            "#
        );
        let registration = sqlx::query_as::<_, Registration>(&sql)
            .bind(id)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;

        Ok(registration)
    }

    async fn mark_attended(&self, id: i64, at: DateTime<Utc>, reject_cancelled: bool) -> Result<Option<Registration>> {
        let sql = format!(
            r#"
            UPDATE registrations
            SET attended_at = $2, status = 'Attended', updated_at = $2
            WHERE id = $1
              AND attended_at IS NULL
              AND (NOT $3 OR status <> 'Cancelled')
            RETURNING {REGISTRATION_COLUMNS}
            "#
        );
        let registration = sqlx::query_as::<_, Registration>(&sql)
            .bind(id)
            .bind(at)
            .bind(reject_cancelled)
            .fetch_optional(&self.pool)
            .await?;

        Ok(registration)
    }

    async fn replace_payment_proof(&self, id: i64, proof: &str, limit: Option<i32>) -> Result<ProofOutcome> {
        let mut tx = self.pool.begin().await?;

        let current: Option<(i64, Option<String>, String)> =
            sqlx::query_as("SELECT event_id, payment_status, status FROM registrations WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some((event_id, payment_status, status)) = current else {
            return Ok(ProofOutcome::Unchanged);
        };
        let reopens = payment_status.as_deref() == Some("Rejected") && status == "Cancelled";

        if reopens {
            // Same lock as admission, so the count cannot race a new registration
            let locked: Option<(i64,)> = sqlx::query_as("SELECT id FROM events WHERE id = $1 FOR UPDATE")
                .bind(event_id)
                .fetch_optional(&mut *tx)
                .await?;
            if let (Some(_), Some(limit)) = (locked, limit) {
                let active: (i64,) = sqlx::query_as(
                    "SELECT COUNT(*) FROM registrations WHERE event_id = $1 AND status <> 'Cancelled'"
                )
                .bind(event_id)
                .fetch_one(&mut *tx)
                .await?;
                if active.0 >= i64::from(limit) {
                    debug!(event_id = event_id, registration_id = id, active = active.0, limit = limit, "Rejected order cannot reopen");
                    return Ok(ProofOutcome::CapacityReached);
                }
            }
        }

        let sql = format!(
            r#"
            UPDATE registrations
            SET payment_proof = $2,
                status = CASE WHEN $4 THEN 'Pending' ELSE status END,
                payment_status = 'Pending',
                updated_at = $3
            WHERE id = $1
              AND payment_status IS DISTINCT FROM 'Approved'
              AND (NOT $4 OR (payment_status = 'Rejected' AND status = 'Cancelled'))
            RETURNING {REGISTRATION_COLUMNS}
            "#
        );
        let registration = sqlx::query_as::<_, Registration>(&sql)
            .bind(id)
            .bind(proof)
            .bind(Utc::now())
            .bind(reopens)
            .fetch_optional(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(match registration {
            Some(registration) => ProofOutcome::Replaced(registration),
            None => ProofOutcome::Unchanged,
        })
    }
}
