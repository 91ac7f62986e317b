//! HTTP error mapping
//!
//! Turns a [`CampusEventsError`] into a status code plus a JSON body carrying
//! the stable error code. Internal failures are logged in full and reported to
//! the client without details.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::utils::errors::CampusEventsError;

#[derive(Debug)]
pub struct ApiError(pub CampusEventsError);

#[derive(Debug, Serialize)]
struct ErrorResponse {
    code: &'static str,
    message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            CampusEventsError::NotFound { .. } => StatusCode::NOT_FOUND,
            CampusEventsError::Forbidden(_) => StatusCode::FORBIDDEN,
            CampusEventsError::Authentication(_) => StatusCode::UNAUTHORIZED,
            CampusEventsError::AlreadyRegistered
            | CampusEventsError::AlreadySettled(_)
            | CampusEventsError::DuplicateScan { .. }
            | CampusEventsError::AlreadyExists(_) => StatusCode::CONFLICT,
            CampusEventsError::DeadlinePassed
            | CampusEventsError::CapacityReached
            | CampusEventsError::OutOfStock { .. }
            | CampusEventsError::PurchaseLimitExceeded { .. }
            | CampusEventsError::InvalidTransition(_)
            | CampusEventsError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            CampusEventsError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CampusEventsError> for ApiError {
    fn from(err: CampusEventsError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.0.code();

        let message = if self.0.is_internal() {
            tracing::error!(
                status = %status,
                code = code,
                severity = %self.0.severity(),
                error = %self.0,
                "Internal server error"
            );
            match &self.0 {
                // Reconciliation needs to be visible to the operator calling the API
                CampusEventsError::InconsistentState(_) => self.0.to_string(),
                _ => "An internal error occurred".to_string(),
            }
        } else {
            self.0.to_string()
        };

        (status, Json(ErrorResponse { code, message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError(CampusEventsError::not_found("Event", 1)).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError(CampusEventsError::AlreadyRegistered).status(), StatusCode::CONFLICT);
        assert_eq!(ApiError(CampusEventsError::CapacityReached).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError(CampusEventsError::InconsistentState("stock".to_string())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let response = ApiError(CampusEventsError::Config("secret dsn".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
