//! Platform Error Types

use axum::{
    extract::rejection::{FormRejection, JsonRejection, QueryRejection},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::api::common::ApiError;
use crate::service::token::TokenError;

#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Authorization error: {message}")]
    Unauthorized { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl PlatformError {
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict { message: message.into() }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into() }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized { message: message.into() }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden { message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    /// Stable error code surfaced to clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Conflict { .. } => "CONFLICT",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Unauthorized { .. } => "UNAUTHORIZED",
            Self::Forbidden { .. } => "FORBIDDEN",
            Self::Database(_) | Self::Json(_) | Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::Database(_) | Self::Json(_) | Self::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<TokenError> for PlatformError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(e) => Self::internal(format!("Token signing failed: {}", e)),
            other => Self::unauthorized(other.to_string()),
        }
    }
}

impl From<JsonRejection> for PlatformError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl From<FormRejection> for PlatformError {
    fn from(rejection: FormRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for PlatformError {
    fn from(rejection: QueryRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl IntoResponse for PlatformError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (message, details) = match &self {
            Self::NotFound { entity_type, id } => (
                format!("{} with ID '{}' not found", entity_type, id),
                Some(serde_json::json!({ "resource": entity_type, "id": id })),
            ),
            Self::Database(_) | Self::Json(_) | Self::Internal { .. } => {
                error!(error = %self, "Request failed with internal error");
                ("An unexpected error occurred".to_string(), None)
            }
            Self::Conflict { message }
            | Self::Validation { message }
            | Self::Unauthorized { message }
            | Self::Forbidden { message } => (message.clone(), None),
        };

        let body = ApiError {
            error: self.code().to_string(),
            message,
            details,
        };

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

pub type Result<T> = std::result::Result<T, PlatformError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(PlatformError::unauthorized("x").status(), StatusCode::UNAUTHORIZED);
        assert_eq!(PlatformError::forbidden("x").status(), StatusCode::FORBIDDEN);
        assert_eq!(PlatformError::not_found("Event", "EVT-1").status(), StatusCode::NOT_FOUND);
        assert_eq!(PlatformError::validation("x").status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(PlatformError::conflict("x").status(), StatusCode::CONFLICT);
        assert_eq!(PlatformError::internal("x").status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_token_errors_are_unauthorized() {
        let err: PlatformError = TokenError::MissingSubject.into();
        assert_eq!(err.code(), "UNAUTHORIZED");

        let err: PlatformError = TokenError::InvalidToken("bad signature".into()).into();
        assert_eq!(err.code(), "UNAUTHORIZED");
    }

    #[test]
    fn test_unauthorized_response_has_challenge_header() {
        let response = PlatformError::unauthorized("Missing token").into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }
}
