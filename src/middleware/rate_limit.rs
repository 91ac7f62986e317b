//! Per-caller rate limiting
//!
//! Applied to mutating routes. Callers are keyed by the `X-User-Id` header;
//! requests without one pass through and are rejected by the identity
//! extractor instead.

use std::num::NonZeroU32;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use tracing::warn;

use crate::config::settings::RateLimitConfig;
use crate::handlers::error::ApiError;
use crate::middleware::auth::caller_id;
use crate::utils::errors::CampusEventsError;

/// Keyed token-bucket limiter shared by all request handlers
pub struct CallerRateLimiter {
    limiter: DefaultKeyedRateLimiter<i64>,
}

impl CallerRateLimiter {
    /// `None` when rate limiting is disabled
    pub fn from_config(config: &RateLimitConfig) -> Option<Arc<Self>> {
        if !config.enabled {
            return None;
        }
        let per_minute = NonZeroU32::new(config.requests_per_minute)?;
        let burst = NonZeroU32::new(config.burst).unwrap_or(per_minute);

        Some(Arc::new(Self {
            limiter: RateLimiter::keyed(Quota::per_minute(per_minute).allow_burst(burst)),
        }))
    }

    pub fn check(&self, user_id: i64) -> bool {
        self.limiter.check_key(&user_id).is_ok()
    }
}

pub async fn rate_limit(State(limiter): State<Arc<CallerRateLimiter>>, request: Request, next: Next) -> Response {
    if let Some(user_id) = caller_id(request.headers()) {
        if !limiter.check(user_id) {
            warn!(user_id = user_id, path = %request.uri().path(), "Rate limit exceeded");
            return ApiError(CampusEventsError::RateLimitExceeded).into_response();
        }
    }
    next.run(request).await
}
