//! Registration, settlement and attendance routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::handlers::{error::ApiError, AppState};
use crate::models::{
    Admission, AttendanceDashboard, Caller, ParticipantEntry, RegisterRequest, Registration, RegistrationWithEvent,
    ScanReceipt,
};
use crate::services::OrganizerAnalytics;

#[derive(Debug, Deserialize)]
pub struct PaymentProofBody {
    pub payment_proof: String,
}

#[derive(Debug, Deserialize)]
pub struct ScanBody {
    pub ticket_id: String,
}

pub async fn register(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Admission>), ApiError> {
    let admission = state.services.registration_service.register(&caller, request).await?;
    Ok((StatusCode::CREATED, Json(admission)))
}

pub async fn history(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<RegistrationWithEvent>>, ApiError> {
    Ok(Json(state.services.registration_service.history(&caller).await?))
}

pub async fn upload_payment_proof(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i64>,
    Json(body): Json<PaymentProofBody>,
) -> Result<Json<Registration>, ApiError> {
    let registration = state
        .services
        .registration_service
        .upload_payment_proof(&caller, id, body.payment_proof)
        .await?;
    Ok(Json(registration))
}

pub async fn cancel(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i64>,
) -> Result<Json<Registration>, ApiError> {
    Ok(Json(state.services.settlement_service.cancel_registration(&caller, id).await?))
}

pub async fn approve(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i64>,
) -> Result<Json<Registration>, ApiError> {
    Ok(Json(state.services.settlement_service.approve_payment(&caller, id).await?))
}

pub async fn reject(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i64>,
) -> Result<Json<Registration>, ApiError> {
    Ok(Json(state.services.settlement_service.reject_payment(&caller, id).await?))
}

pub async fn mark_attended(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i64>,
) -> Result<Json<Registration>, ApiError> {
    Ok(Json(state.services.attendance_service.mark_attended_manually(&caller, id).await?))
}

pub async fn scan(
    State(state): State<AppState>,
    caller: Caller,
    Json(body): Json<ScanBody>,
) -> Result<Json<ScanReceipt>, ApiError> {
    Ok(Json(state.services.attendance_service.scan_ticket(&caller, &body.ticket_id).await?))
}

pub async fn event_registrations(
    State(state): State<AppState>,
    caller: Caller,
    Path(event_id): Path<i64>,
) -> Result<Json<Vec<ParticipantEntry>>, ApiError> {
    Ok(Json(state.services.registration_service.event_registrations(&caller, event_id).await?))
}

pub async fn attendance_dashboard(
    State(state): State<AppState>,
    caller: Caller,
    Path(event_id): Path<i64>,
) -> Result<Json<AttendanceDashboard>, ApiError> {
    Ok(Json(state.services.attendance_service.dashboard(&caller, event_id).await?))
}

pub async fn analytics(State(state): State<AppState>, caller: Caller) -> Result<Json<OrganizerAnalytics>, ApiError> {
    Ok(Json(state.services.analytics_service.organizer_analytics(&caller).await?))
}
