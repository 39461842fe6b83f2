//! Authentication API handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Extension, Json};

use super::dto::{AuthResponse, LoginRequest, RegisterRequest, UserProfile};
use crate::auth::jwt::{issue_token, JwtConfig};
use crate::auth::middleware::CurrentUser;
use crate::auth::password::{hash_password, verify_password};
use crate::domain::{CreateUserDto, DomainError, RepositoryProvider, User};
use crate::interfaces::http::common::{ApiResponse, ValidatedJson};

/// Auth state
#[derive(Clone)]
pub struct AuthHandlerState {
    pub repos: Arc<dyn RepositoryProvider>,
    pub jwt_config: JwtConfig,
}

fn crypto_err(e: impl std::fmt::Display) -> DomainError {
    DomainError::Crypto(e.to_string())
}

/// The one external response for both "no such user" and "wrong password".
fn invalid_credentials() -> DomainError {
    DomainError::Unauthorized("Invalid credentials".to_string())
}

fn auth_response(user: User, state: &AuthHandlerState) -> Result<AuthResponse, DomainError> {
    let token = issue_token(&user.id, &state.jwt_config).map_err(crypto_err)?;

    Ok(AuthResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_config.expiration_hours * 3600,
        user: user.into(),
    })
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = ApiResponse<AuthResponse>),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Email already in use")
    )
)]
pub async fn register(
    State(state): State<AuthHandlerState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>), DomainError> {
    let existing = state.repos.users().find_by_email(&request.email).await?;
    if existing.is_some() {
        return Err(DomainError::Conflict("Email already in use".to_string()));
    }

    let password_hash = hash_password(&request.password).map_err(crypto_err)?;

    // A concurrent registration with the same email loses on the unique
    // constraint and surfaces as the same Conflict as the check above.
    let user = state
        .repos
        .users()
        .create_user(CreateUserDto {
            email: request.email,
            password_hash,
            first_name: request.first_name,
            last_name: request.last_name,
            phone: request.phone,
        })
        .await?;

    tracing::info!(user_id = %user.id, "New user registered");

    let response = auth_response(user, &state)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(response))))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Successful login", body = ApiResponse<AuthResponse>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AuthHandlerState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, DomainError> {
    let user = state.repos.users().find_by_email(&request.email).await?;

    let Some(user) = user else {
        return Err(invalid_credentials());
    };

    // Ok(false) is a mismatch; Err is a corrupt digest and must not be
    // reported as bad credentials.
    let password_valid =
        verify_password(&request.password, &user.password_hash).map_err(crypto_err)?;
    if !password_valid {
        return Err(invalid_credentials());
    }

    let response = auth_response(user, &state)?;
    Ok(Json(ApiResponse::success(response)))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = ApiResponse<UserProfile>),
        (status = 401, description = "Missing, invalid or expired token")
    )
)]
pub async fn me(
    user: Option<Extension<CurrentUser>>,
) -> Result<Json<ApiResponse<UserProfile>>, DomainError> {
    // Identity was already resolved by the session middleware; no lookup.
    let Some(Extension(user)) = user else {
        return Err(DomainError::Unauthorized("Not authenticated".to_string()));
    };

    Ok(Json(ApiResponse::success(user.into())))
}
