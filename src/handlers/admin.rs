//! Admin routes for organizer accounts

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::handlers::{error::ApiError, AppState};
use crate::models::{Caller, CreateOrganizerRequest, RemovalAction, User};
use crate::services::RemovalOutcome;

#[derive(Debug, Default, Deserialize)]
pub struct RemovalQuery {
    #[serde(default)]
    pub action: RemovalAction,
}

pub async fn create_organizer(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<CreateOrganizerRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let organizer = state.services.admin_service.create_organizer(&caller, request).await?;
    Ok((StatusCode::CREATED, Json(organizer)))
}

pub async fn list_organizers(State(state): State<AppState>, caller: Caller) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(state.services.admin_service.list_organizers(&caller).await?))
}

pub async fn remove_organizer(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i64>,
    Query(query): Query<RemovalQuery>,
) -> Result<Json<RemovalOutcome>, ApiError> {
    Ok(Json(state.services.admin_service.remove_organizer(&caller, id, query.action).await?))
}
