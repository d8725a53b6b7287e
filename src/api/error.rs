use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ApiResponse;
use crate::services::{AcceptanceError, CategoryError, ReportError};

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    DatabaseError(String),

    ValidationError(String),

    Conflict(String),

    InternalError(String),

    Unauthorized(String),

    Forbidden(String),

    RateLimited { retry_after_secs: u64 },

    /// Transient contention; the client should retry.
    Unavailable { message: String, retry_after_secs: u64 },
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::ValidationError(msg) => write!(f, "Validation error: {msg}"),
            Self::Conflict(msg) => write!(f, "Conflict: {msg}"),
            Self::InternalError(msg) => write!(f, "Internal error: {msg}"),
            Self::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
            Self::Forbidden(msg) => write!(f, "Forbidden: {msg}"),
            Self::RateLimited { retry_after_secs } => {
                write!(f, "Rate limited, retry after {retry_after_secs}s")
            }
            Self::Unavailable { message, .. } => write!(f, "Unavailable: {message}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut retry_after = None;
        let (status, error_message) = match &self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            Self::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            Self::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            Self::RateLimited { retry_after_secs } => {
                retry_after = Some(*retry_after_secs);
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    "You've performed this action too many times. Please wait before trying again."
                        .to_string(),
                )
            }
            Self::Unavailable {
                message,
                retry_after_secs,
            } => {
                retry_after = Some(*retry_after_secs);
                (StatusCode::SERVICE_UNAVAILABLE, message.clone())
            }
        };

        let body = ApiResponse::<()>::error(error_message);
        let mut response = (status, Json(body)).into_response();
        if let Some(secs) = retry_after
            && let Ok(value) = HeaderValue::from_str(&secs.max(1).to_string())
        {
            response.headers_mut().insert(header::RETRY_AFTER, value);
        }
        response
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(err.to_string())
    }
}

impl From<AcceptanceError> for ApiError {
    fn from(err: AcceptanceError) -> Self {
        match err {
            AcceptanceError::PermissionDenied => Self::forbidden(),
            AcceptanceError::RateLimited { retry_after_secs } => {
                Self::RateLimited { retry_after_secs }
            }
            AcceptanceError::NotFound(msg) => Self::NotFound(msg),
            AcceptanceError::LockTimeout { topic_id } => Self::Unavailable {
                message: format!("Topic {topic_id} is busy, please retry"),
                retry_after_secs: 1,
            },
            AcceptanceError::Conflict(msg) => Self::Conflict(msg),
            AcceptanceError::Validation(msg) => Self::ValidationError(msg),
            AcceptanceError::Database(msg) => Self::DatabaseError(msg),
            AcceptanceError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

impl From<CategoryError> for ApiError {
    fn from(err: CategoryError) -> Self {
        match err {
            CategoryError::NotFound(id) => Self::not_found("Category", id),
            CategoryError::TopicNotFound(id) => Self::not_found("Topic", id),
            CategoryError::Validation(msg) => Self::ValidationError(msg),
            CategoryError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::NotFound(msg) => Self::NotFound(msg),
            ReportError::Validation(msg) => Self::ValidationError(msg),
            ReportError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

impl ApiError {
    pub fn not_found(resource: &str, id: impl fmt::Display) -> Self {
        Self::NotFound(format!("{resource} {id} not found"))
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }

    #[must_use]
    pub fn forbidden() -> Self {
        Self::Forbidden("You are not permitted to perform this action".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_timeout_maps_to_retryable_unavailable() {
        let response = ApiError::from(AcceptanceError::LockTimeout { topic_id: 7 }).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            response.headers().get(header::RETRY_AFTER).and_then(|v| v.to_str().ok()),
            Some("1")
        );
    }

    #[test]
    fn rate_limit_sets_retry_after() {
        let response = ApiError::RateLimited {
            retry_after_secs: 25,
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response.headers().get(header::RETRY_AFTER).and_then(|v| v.to_str().ok()),
            Some("25")
        );
    }

    #[test]
    fn permission_denied_is_forbidden() {
        let response = ApiError::from(AcceptanceError::PermissionDenied).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
