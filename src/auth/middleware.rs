//! Session-resolving middleware for Axum
//!
//! Extracts the bearer token, verifies it, resolves the subject to a live
//! user record, and attaches the identity to request extensions. Any
//! failure short-circuits with an unauthorized response; identity is never
//! partially attached.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;

use super::jwt::{verify_token, AuthError, JwtConfig};
use crate::domain::{RepositoryProvider, User};

/// Authentication state: process-wide immutable configuration plus the
/// stores the resolver and guards consult.
#[derive(Clone)]
pub struct AuthState {
    pub repos: Arc<dyn RepositoryProvider>,
    pub jwt_config: JwtConfig,
}

/// The resolved identity attached to a request.
///
/// Built from the stored user record with the password hash dropped; the
/// hash cannot reach a response through this type.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct CurrentUser {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            phone: user.phone,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Extract the token from an Authorization header value
fn extract_bearer(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ")
}

/// Session-resolving middleware - requires a valid token bound to an
/// existing user.
pub async fn auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(String::from);
    let Some(auth_header) = auth_header else {
        return auth_error_response(&AuthError::MissingToken);
    };

    let Some(token) = extract_bearer(&auth_header) else {
        return auth_error_response(&AuthError::InvalidToken);
    };

    let claims = match verify_token(token, &auth_state.jwt_config) {
        Ok(claims) => claims,
        Err(e) => return auth_error_response(&e),
    };

    // Resolve the subject to a live record. A deleted account outliving a
    // still-valid token is expected and reads as unauthorized, not a 500.
    let user = match auth_state.repos.users().find_by_id(&claims.sub).await {
        Ok(user) => user,
        Err(e) => {
            tracing::error!("Failed to resolve token subject: {}", e);
            return internal_error_response();
        }
    };

    let Some(user) = user else {
        return auth_error_response(&AuthError::UnknownSubject);
    };

    request.extensions_mut().insert(CurrentUser::from(user));

    next.run(request).await
}

/// Map an auth failure to its client-facing response.
pub(crate) fn auth_error_response(error: &AuthError) -> Response {
    let status = match error {
        AuthError::MissingToken
        | AuthError::InvalidToken
        | AuthError::ExpiredToken
        | AuthError::UnknownSubject
        | AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        AuthError::NotBandMember | AuthError::NotBandAdmin => StatusCode::FORBIDDEN,
    };

    let body = Json(json!({
        "success": false,
        "error": error.to_string()
    }));

    (status, body).into_response()
}

/// Generic 500 without internal detail.
pub(crate) fn internal_error_response() -> Response {
    let body = Json(json!({
        "success": false,
        "error": "Internal server error"
    }));

    (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_extraction() {
        assert_eq!(extract_bearer("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(extract_bearer("bearer abc"), None);
        assert_eq!(extract_bearer("Basic dXNlcg=="), None);
        assert_eq!(extract_bearer(""), None);
    }

    #[test]
    fn current_user_serialization_has_no_password_hash() {
        let user = User {
            id: "u1".to_string(),
            email: "a@x.com".to_string(),
            password_hash: "$2b$12$secret".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            phone: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&CurrentUser::from(user)).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("secret"));
    }
}
