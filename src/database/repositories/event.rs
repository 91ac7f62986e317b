//! Event repository implementation

use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::database::store::EventStore;
use crate::models::event::{CreateEventRequest, Event, EventStatus, PublishedEventFilter, UpdateEventRequest};
use crate::utils::errors::Result;

const EVENT_COLUMNS: &str = "id, organizer_id, name, description, kind, eligibility, tags, \
    registration_deadline, event_start, event_end, registration_limit, registration_fee, \
    sizes, colors, variants, quantity, purchase_limit, status, form, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventStore for EventRepository {
    /// Create a new event
    async fn create(&self, organizer_id: i64, request: &CreateEventRequest) -> Result<Event> {
        let sql = format!(
            r#"
            INSERT INTO events (organizer_id, name, description, kind, eligibility, tags,
                registration_deadline, event_start, event_end, registration_limit, registration_fee,
                sizes, colors, variants, quantity, purchase_limit, status, form, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, 'Draft', $17, $18, $18)
            RETURNING {EVENT_COLUMNS}
            "#
        );

        let event = sqlx::query_as::<_, Event>(&sql)
            .bind(organizer_id)
            .bind(&request.name)
            .bind(&request.description)
            .bind(request.kind.as_str())
            .bind(&request.eligibility)
            .bind(&request.tags)
            .bind(request.registration_deadline)
            .bind(request.event_start)
            .bind(request.event_end)
            .bind(request.registration_limit)
            .bind(request.registration_fee)
            .bind(&request.sizes)
            .bind(&request.colors)
            .bind(&request.variants)
            .bind(request.quantity)
            .bind(request.purchase_limit.unwrap_or(1))
            .bind(Json(request.form.clone()))
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;

        Ok(event)
    }

    /// Find event by ID
    async fn find_by_id(&self, id: i64) -> Result<Option<Event>> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1");
        let event = sqlx::query_as::<_, Event>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(event)
    }

    /// Update event
    async fn update(&self, id: i64, changes: &UpdateEventRequest) -> Result<Option<Event>> {
        let sql = format!(
            r#"
            UPDATE events
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                kind = COALESCE($4, kind),
                eligibility = COALESCE($5, eligibility),
                tags = COALESCE($6, tags),
                registration_deadline = COALESCE($7, registration_deadline),
                event_start = COALESCE($8, event_start),
                event_end = COALESCE($9, event_end),
                registration_limit = COALESCE($10, registration_limit),
                registration_fee = COALESCE($11, registration_fee),
                sizes = COALESCE($12, sizes),
                colors = COALESCE($13, colors),
                variants = COALESCE($14, variants),
                quantity = COALESCE($15, quantity),
                purchase_limit = COALESCE($16, purchase_limit),
                form = COALESCE($17, form),
                status = COALESCE($18, status),
                updated_at = $19
            WHERE id = $1
            RETURNING {EVENT_COLUMNS}
            "#
        );

        let event = sqlx::query_as::<_, Event>(&sql)
            .bind(id)
            .bind(&changes.name)
            .bind(&changes.description)
            .bind(changes.kind.map(|k| k.as_str()))
            .bind(&changes.eligibility)
            .bind(&changes.tags)
            .bind(changes.registration_deadline)
            .bind(changes.event_start)
            .bind(changes.event_end)
            .bind(changes.registration_limit)
            .bind(changes.registration_fee)
            .bind(&changes.sizes)
            .bind(&changes.colors)
            .bind(&changes.variants)
            .bind(changes.quantity)
            .bind(changes.purchase_limit)
            .bind(changes.form.clone().map(Json))
            .bind(changes.status.map(|s| s.as_str()))
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;

        Ok(event)
    }

    async fn update_status_if(&self, id: i64, expected: EventStatus, new: EventStatus) -> Result<Option<Event>> {
        let sql = format!(
            "UPDATE events SET status = $3, updated_at = $4 WHERE id = $1 AND status = $2 RETURNING {EVENT_COLUMNS}"
        );
        let event = sqlx::query_as::<_, Event>(&sql)
            .bind(id)
            .bind(expected.as_str())
            .bind(new.as_str())
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;

        Ok(event)
    }

    /// Delete event
    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Get events created by an organizer
    async fn list_by_organizer(&self, organizer_id: i64) -> Result<Vec<Event>> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE organizer_id = $1 ORDER BY created_at DESC, id DESC"
        );
        let events = sqlx::query_as::<_, Event>(&sql)
            .bind(organizer_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(events)
    }

    async fn list_published(&self, filter: &PublishedEventFilter) -> Result<Vec<Event>> {
        let sql = format!(
            r#"
            SELECT {EVENT_COLUMNS} FROM events
            WHERE status = 'Published'
              AND ($1::TEXT IS NULL OR kind = $1)
              AND ($2::TEXT IS NULL OR COALESCE(eligibility, '') ILIKE '%' || $2 || '%')
              AND ($3::TIMESTAMPTZ IS NULL OR event_start >= $3)
              AND ($4::TIMESTAMPTZ IS NULL OR event_start <= $4)
              AND ($5::BIGINT[] IS NULL OR organizer_id = ANY($5))
            ORDER BY event_start ASC NULLS LAST, id ASC
            "#
        );
        let events = sqlx::query_as::<_, Event>(&sql)
            .bind(filter.kind.map(|k| k.as_str()))
            .bind(&filter.eligibility)
            .bind(filter.date_from)
            .bind(filter.date_to)
            .bind(&filter.organizer_ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(events)
    }

    async fn try_decrement_stock(&self, id: i64, quantity: i32) -> Result<Option<i32>> {
        let remaining: Option<(i32,)> = sqlx::query_as(
            r#"
            UPDATE events
            SET quantity = quantity - $2, updated_at = $3
            WHERE id = $1 AND quantity >= $2
            RETURNING quantity
            "#
        )
        .bind(id)
        .bind(quantity)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(remaining.map(|r| r.0))
    }

    async fn increment_stock(&self, id: i64, quantity: i32) -> Result<Option<i32>> {
        let remaining: Option<(i32,)> = sqlx::query_as(
            r#"
            UPDATE events
            SET quantity = COALESCE(quantity, 0) + $2, updated_at = $3
            WHERE id = $1
            RETURNING quantity
            "#
        )
        .bind(id)
        .bind(quantity)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(remaining.map(|r| r.0))
    }
}
