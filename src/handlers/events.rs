//! Event routes

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::handlers::{error::ApiError, AppState};
use crate::models::{Caller, CreateEventRequest, Event, EventDetails, EventKind, PublishedEventFilter, UpdateEventRequest};

/// Query string of the published-event listing. `organizer_ids` is comma separated.
#[derive(Debug, Default, Deserialize)]
pub struct PublishedQuery {
    pub kind: Option<EventKind>,
    pub eligibility: Option<String>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub organizer_ids: Option<String>,
}

impl PublishedQuery {
    fn into_filter(self) -> Result<PublishedEventFilter, ApiError> {
        let organizer_ids = match self.organizer_ids {
            Some(raw) => Some(
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|s| s.parse::<i64>())
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|_| {
                        ApiError(crate::utils::errors::CampusEventsError::InvalidInput(
                            "organizer_ids must be a comma separated list of ids".to_string(),
                        ))
                    })?,
            ),
            None => None,
        };

        Ok(PublishedEventFilter {
            kind: self.kind,
            eligibility: self.eligibility.filter(|e| !e.trim().is_empty()),
            date_from: self.date_from,
            date_to: self.date_to,
            organizer_ids,
        })
    }
}

pub async fn create_event(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    let event = state.services.event_service.create_event(&caller, request).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn list_published(
    State(state): State<AppState>,
    Query(query): Query<PublishedQuery>,
) -> Result<Json<Vec<Event>>, ApiError> {
    let filter = query.into_filter()?;
    Ok(Json(state.services.event_service.list_published(&filter).await?))
}

pub async fn list_mine(State(state): State<AppState>, caller: Caller) -> Result<Json<Vec<Event>>, ApiError> {
    Ok(Json(state.services.event_service.list_organizer_events(&caller).await?))
}

pub async fn get_event(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i64>,
) -> Result<Json<EventDetails>, ApiError> {
    Ok(Json(state.services.event_service.get_event(&caller, id).await?))
}

pub async fn update_event(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i64>,
    Json(request): Json<UpdateEventRequest>,
) -> Result<Json<Event>, ApiError> {
    Ok(Json(state.services.event_service.update_event(&caller, id, request).await?))
}

pub async fn publish_event(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i64>,
) -> Result<Json<Event>, ApiError> {
    Ok(Json(state.services.event_service.publish_event(&caller, id).await?))
}

pub async fn delete_event(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.services.event_service.delete_event(&caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
