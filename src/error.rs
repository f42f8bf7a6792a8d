//! Error types for Tabetala server

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Machine-readable error codes returned alongside the message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    NotAuthenticated,
    Forbidden,
    NoScheduledClass,
    NotFound,
    Conflict,
    Internal,
}

const NO_SCHEDULED_CLASS: &str =
    "No scheduled class found for this faculty member in the specified laboratory at this time";

/// Context reported when no schedule covers a check-in attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleMiss {
    /// Weekday used for matching (0 = Sunday)
    pub current_day: i16,
    /// Local time used for matching (HH:MM)
    pub current_time: String,
    pub lab_id: String,
    pub user_id: String,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("{}", NO_SCHEDULED_CLASS)]
    NoScheduledClass(ScheduleMiss),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable message
    pub error: String,
    pub code: ErrorCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
}

impl AppError {
    /// HTTP status and error code for this error
    pub fn status(&self) -> (StatusCode, ErrorCode) {
        match self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, ErrorCode::ValidationError),
            AppError::Authentication(_) => (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthenticated),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, ErrorCode::Forbidden),
            AppError::NoScheduledClass(_) => (StatusCode::FORBIDDEN, ErrorCode::NoScheduledClass),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::NotFound),
            AppError::Conflict(_) => (StatusCode::CONFLICT, ErrorCode::Conflict),
            AppError::Database(_) | AppError::Redis(_) | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::Internal)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status();

        let (message, details) = match self {
            AppError::Validation(msg)
            | AppError::Authentication(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg) => (msg, None),
            AppError::NoScheduledClass(miss) => {
                (NO_SCHEDULED_CLASS.to_string(), serde_json::to_value(&miss).ok())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                ("Database error".to_string(), None)
            }
            AppError::Redis(e) => {
                tracing::error!("Redis error: {:?}", e);
                ("Internal server error".to_string(), None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ("Internal server error".to_string(), None)
            }
        };

        let body = Json(ErrorResponse {
            error: message,
            code,
            details,
        });

        (status, body).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .values()
            .flat_map(|errs| errs.iter())
            .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .unwrap_or_else(|| errors.to_string());
        AppError::Validation(message)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_http_status() {
        assert_eq!(AppError::Validation("x".into()).status().0, StatusCode::BAD_REQUEST);
        assert_eq!(AppError::NotFound("x".into()).status().0, StatusCode::NOT_FOUND);
        assert_eq!(AppError::Forbidden("x".into()).status().0, StatusCode::FORBIDDEN);
        assert_eq!(AppError::Conflict("x".into()).status().0, StatusCode::CONFLICT);
        assert_eq!(
            AppError::Internal("x".into()).status().0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Database(sqlx::Error::RowNotFound).status().0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn missing_schedule_is_forbidden_with_details() {
        let err = AppError::NoScheduledClass(ScheduleMiss {
            current_day: 1,
            current_time: "10:15".into(),
            lab_id: "lab-1".into(),
            user_id: "faculty-2".into(),
        });
        assert_eq!(err.status(), (StatusCode::FORBIDDEN, ErrorCode::NoScheduledClass));
        assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn validator_messages_become_validation_errors() {
        let mut errors = validator::ValidationErrors::new();
        let mut error = validator::ValidationError::new("length");
        error.message = Some("Password must be at least 8 characters".into());
        errors.add("password", error);

        match AppError::from(errors) {
            AppError::Validation(msg) => assert_eq!(msg, "Password must be at least 8 characters"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
