use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::notification::NotificationError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Notification(#[from] NotificationError),

    #[error("Not found: {0}")]
    NotFound(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

/// Check if running in production mode (based on RUN_MODE env var)
fn is_production() -> bool {
    std::env::var("RUN_MODE")
        .map(|m| m == "production" || m == "prod")
        .unwrap_or(false)
}

fn internal(
    code: &'static str,
    public: &str,
    detail: String,
) -> (StatusCode, &'static str, String, String) {
    let client_msg = if is_production() {
        public.to_string()
    } else {
        detail.clone()
    };
    (StatusCode::INTERNAL_SERVER_ERROR, code, client_msg, detail)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, client_message, log_message) = match &self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                msg.clone(),
                msg.clone(),
            ),
            AppError::Notification(e @ NotificationError::InvalidCategory(_)) => (
                StatusCode::BAD_REQUEST,
                "INVALID_CATEGORY",
                e.to_string(),
                e.to_string(),
            ),
            AppError::Notification(e @ NotificationError::InvalidId(_)) => (
                StatusCode::BAD_REQUEST,
                "INVALID_ID",
                e.to_string(),
                e.to_string(),
            ),
            AppError::Notification(e) => {
                internal("REGISTRY_ERROR", "Notification registry unavailable", e.to_string())
            }
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                msg.clone(),
                msg.clone(),
            ),
        };

        // 4xx at warn, 5xx at error
        if status.is_server_error() {
            tracing::error!(
                code = %code,
                status = %status.as_u16(),
                message = %log_message,
                "API error"
            );
        } else {
            tracing::warn!(
                code = %code,
                status = %status.as_u16(),
                message = %log_message,
                "API request rejected"
            );
        }

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: client_message,
            },
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_category_is_bad_request() {
        let response =
            AppError::from(NotificationError::InvalidCategory("bogus".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_invalid_id_is_bad_request() {
        let response =
            AppError::from(NotificationError::InvalidId("x".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_provider_errors_are_internal() {
        let response = AppError::from(NotificationError::NotInitialized).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_not_found_status() {
        let response = AppError::NotFound("ntf-1".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
