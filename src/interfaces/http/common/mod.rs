//! Shared HTTP plumbing: the response envelope, the validated JSON
//! extractor, and the single place where domain failures become status
//! codes.

pub mod validated_json;

pub use validated_json::ValidatedJson;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::DomainError;

/// Standard response envelope.
///
/// Success: `{"success": true, "data": {...}}`,
/// failure: `{"success": false, "error": "message"}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// `true` if the request succeeded
    pub success: bool,
    /// Payload, `null` on failure
    pub data: Option<T>,
    /// Error message, absent on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Outermost error mapping: kind → status code and a safe message.
/// Internal detail (driver errors, hash corruption) is logged and replaced
/// with a generic message.
impl IntoResponse for DomainError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            DomainError::NotFound { entity, .. } => {
                (StatusCode::NOT_FOUND, format!("{} not found", entity))
            }
            DomainError::Validation(message) => (StatusCode::BAD_REQUEST, message),
            DomainError::Conflict(message) => (StatusCode::CONFLICT, message),
            DomainError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message),
            DomainError::Forbidden(message) => (StatusCode::FORBIDDEN, message),
            DomainError::Database(ref detail) | DomainError::Crypto(ref detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ApiResponse::<()>::error(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_envelope_skips_data_error_fields_correctly() {
        let ok = serde_json::to_value(ApiResponse::success(1)).unwrap();
        assert_eq!(ok["success"], true);
        assert_eq!(ok["data"], 1);
        assert!(ok.get("error").is_none());

        let err = serde_json::to_value(ApiResponse::<()>::error("nope")).unwrap();
        assert_eq!(err["success"], false);
        assert_eq!(err["error"], "nope");
    }

    #[tokio::test]
    async fn internal_detail_never_reaches_the_body() {
        let resp = DomainError::Database("UNIQUE constraint on users.email".into())
            .into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(!body.contains("UNIQUE"));
        assert!(body.contains("Internal server error"));
    }
}
