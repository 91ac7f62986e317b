//! Caller identity extraction
//!
//! Authentication happens upstream. The gateway forwards the authenticated
//! user as `X-User-Id` and `X-User-Role`, and this extractor trusts them.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::handlers::error::ApiError;
use crate::models::{Caller, UserRole};
use crate::utils::errors::CampusEventsError;

pub const USER_ID_HEADER: &str = "X-User-Id";
pub const USER_ROLE_HEADER: &str = "X-User-Role";

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let user_id = header(USER_ID_HEADER)
            .ok_or_else(|| unauthorized("Missing X-User-Id header"))?
            .parse::<i64>()
            .map_err(|_| unauthorized("X-User-Id must be a numeric user id"))?;
        let role = header(USER_ROLE_HEADER)
            .ok_or_else(|| unauthorized("Missing X-User-Role header"))?
            .parse::<UserRole>()
            .map_err(|e| unauthorized(&e.to_string()))?;

        Ok(Caller::new(user_id, role))
    }
}

/// Numeric caller id from the identity header, if present
pub fn caller_id(parts_headers: &axum::http::HeaderMap) -> Option<i64> {
    parts_headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

fn unauthorized(message: &str) -> ApiError {
    ApiError(CampusEventsError::Authentication(message.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> Result<Caller, ApiError> {
        let (mut parts, _) = request.into_parts();
        Caller::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_extracts_caller_from_headers() {
        let request = Request::builder()
            .header(USER_ID_HEADER, "42")
            .header(USER_ROLE_HEADER, "Organizer")
            .body(())
            .unwrap();
        assert_eq!(extract(request).await.unwrap(), Caller::organizer(42));
    }

    #[tokio::test]
    async fn test_rejects_missing_or_malformed_identity() {
        let missing = Request::builder().body(()).unwrap();
        assert!(matches!(
            extract(missing).await,
            Err(ApiError(CampusEventsError::Authentication(_)))
        ));

        let bad_role = Request::builder()
            .header(USER_ID_HEADER, "42")
            .header(USER_ROLE_HEADER, "superuser")
            .body(())
            .unwrap();
        assert!(extract(bad_role).await.is_err());
    }
}
