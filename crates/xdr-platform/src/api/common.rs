//! Common API types and utilities

use axum::extract::{FromRequest, FromRequestParts};
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::PlatformError;

/// Standard API error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// JSON body extractor whose rejections use the platform error format.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(PlatformError))]
pub struct ApiJson<T>(pub T);

/// Form body extractor whose rejections use the platform error format.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Form), rejection(PlatformError))]
pub struct ApiForm<T>(pub T);

/// Query string extractor whose rejections use the platform error format.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(PlatformError))]
pub struct ApiQuery<T>(pub T);

/// Plain acknowledgement
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Parse an optional enum query parameter, treating empty as absent.
pub fn parse_optional<T>(value: Option<&str>) -> Result<Option<T>, PlatformError>
where
    T: std::str::FromStr<Err = PlatformError>,
{
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => v.parse().map(Some),
        None => Ok(None),
    }
}

/// Client address from `X-Forwarded-For`, if a proxy set one.
pub fn forwarded_for(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Best-effort caller address for audit records.
pub struct ClientIp(pub Option<String>);

#[axum::async_trait]
impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let connected = parts
            .extensions
            .get::<axum::extract::ConnectInfo<std::net::SocketAddr>>()
            .map(|info| info.0.ip().to_string());
        Ok(ClientIp(forwarded_for(parts).or(connected)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Severity;
    use axum::http::Request;

    #[test]
    fn test_parse_optional() {
        assert_eq!(parse_optional::<Severity>(None).unwrap(), None);
        assert_eq!(parse_optional::<Severity>(Some("")).unwrap(), None);
        assert_eq!(parse_optional::<Severity>(Some("high")).unwrap(), Some(Severity::High));
        assert!(parse_optional::<Severity>(Some("extreme")).is_err());
    }

    #[test]
    fn test_forwarded_for() {
        let (parts, _) = Request::builder()
            .header("x-forwarded-for", "10.1.2.3, 172.16.0.1")
            .body(())
            .unwrap()
            .into_parts();
        assert_eq!(forwarded_for(&parts).as_deref(), Some("10.1.2.3"));
    }
}
