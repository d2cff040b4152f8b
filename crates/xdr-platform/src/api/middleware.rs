//! API Middleware
//!
//! Bearer-token authentication extractor and request metrics.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::info;

use crate::error::PlatformError;
use crate::service::{extract_bearer_token, AuthContext, RequestMetrics, TokenService};

/// Shared state the auth extractor reads from request extensions
#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<TokenService>,
}

/// Extractor for authenticated requests.
///
/// Verifies the bearer token only; no store lookup happens per request.
/// Operation-level checks are done by the handler with
/// [`AuthContext::require`].
pub struct Authenticated(pub AuthContext);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = PlatformError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| PlatformError::unauthorized("Not authenticated"))?;

        let token = extract_bearer_token(auth_header)
            .ok_or_else(|| PlatformError::unauthorized("Invalid Authorization header format"))?;

        let app_state = parts
            .extensions
            .get::<AppState>()
            .ok_or_else(|| PlatformError::internal("AppState not found"))?;

        let identity = app_state.tokens.verify(token)?;
        Ok(Authenticated(identity.into()))
    }
}

/// Records every request in [`RequestMetrics`] and stamps `X-Response-Time`.
pub async fn track_requests(
    State(metrics): State<RequestMetrics>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let mut response = next.run(request).await;

    let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
    let status = response.status().as_u16();
    metrics.record(&path, status, duration_ms);

    if let Ok(value) = HeaderValue::from_str(&format!("{:.2}ms", duration_ms)) {
        response.headers_mut().insert("x-response-time", value);
    }

    info!(
        method = %method,
        path = %path,
        status,
        duration_ms = (duration_ms * 100.0).round() / 100.0,
        "Request completed"
    );
    response
}
