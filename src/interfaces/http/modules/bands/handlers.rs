//! Band API handlers
//!
//! Every route here runs behind the session middleware; the per-band
//! routes additionally extract `RequireMember`/`RequireAdmin`, so the
//! allow/deny policy lives in one place (`auth::guards`) instead of being
//! re-queried per handler.

use std::sync::Arc;

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{
    AddMemberRequest, BandDetail, BandDto, CreateBandRequest, MemberDto, UpdateBandRequest,
};
use crate::auth::guards::{RequireAdmin, RequireMember};
use crate::auth::middleware::{AuthState, CurrentUser};
use crate::domain::{CreateBandDto, DomainError, RepositoryProvider, UpdateBandDto};
use crate::interfaces::http::common::{ApiResponse, ValidatedJson};

/// Band handler state. Carries `AuthState` so the guards can extract it
/// via `FromRef`.
#[derive(Clone)]
pub struct BandHandlerState {
    pub repos: Arc<dyn RepositoryProvider>,
    pub auth: AuthState,
}

impl FromRef<BandHandlerState> for AuthState {
    fn from_ref(s: &BandHandlerState) -> Self {
        s.auth.clone()
    }
}

#[utoipa::path(
    post,
    path = "/api/bands",
    tag = "Bands",
    security(("bearer_auth" = [])),
    request_body = CreateBandRequest,
    responses(
        (status = 201, description = "Band created, creator is admin", body = ApiResponse<BandDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn create_band(
    State(state): State<BandHandlerState>,
    user: Option<Extension<CurrentUser>>,
    ValidatedJson(request): ValidatedJson<CreateBandRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BandDto>>), DomainError> {
    let Some(Extension(user)) = user else {
        return Err(DomainError::Unauthorized("Not authenticated".to_string()));
    };

    let band = state
        .repos
        .bands()
        .create_with_admin(
            CreateBandDto {
                name: request.name,
                description: request.description,
            },
            &user.id,
        )
        .await?;

    tracing::info!(band_id = %band.id, user_id = %user.id, "Band created");

    Ok((StatusCode::CREATED, Json(ApiResponse::success(band.into()))))
}

#[utoipa::path(
    get,
    path = "/api/bands/{band_id}",
    tag = "Bands",
    security(("bearer_auth" = [])),
    params(("band_id" = String, Path, description = "Band ID")),
    responses(
        (status = 200, description = "Band details with the caller's role", body = ApiResponse<BandDetail>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not a member of this band")
    )
)]
pub async fn get_band(
    State(state): State<BandHandlerState>,
    RequireMember(membership): RequireMember,
    Path(band_id): Path<String>,
) -> Result<Json<ApiResponse<BandDetail>>, DomainError> {
    let band = state
        .repos
        .bands()
        .find_by_id(&band_id)
        .await?
        .ok_or(DomainError::NotFound {
            entity: "Band",
            field: "id",
            value: band_id,
        })?;

    Ok(Json(ApiResponse::success(BandDetail::new(
        band,
        membership.role,
    ))))
}

#[utoipa::path(
    put,
    path = "/api/bands/{band_id}",
    tag = "Bands",
    security(("bearer_auth" = [])),
    params(("band_id" = String, Path, description = "Band ID")),
    request_body = UpdateBandRequest,
    responses(
        (status = 200, description = "Band updated", body = ApiResponse<BandDto>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not a band admin")
    )
)]
pub async fn update_band(
    State(state): State<BandHandlerState>,
    RequireAdmin(_membership): RequireAdmin,
    Path(band_id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateBandRequest>,
) -> Result<Json<ApiResponse<BandDto>>, DomainError> {
    let band = state
        .repos
        .bands()
        .update_band(
            &band_id,
            UpdateBandDto {
                name: request.name,
                description: request.description,
            },
        )
        .await?
        .ok_or(DomainError::NotFound {
            entity: "Band",
            field: "id",
            value: band_id,
        })?;

    Ok(Json(ApiResponse::success(band.into())))
}

#[utoipa::path(
    get,
    path = "/api/bands/{band_id}/members",
    tag = "Bands",
    security(("bearer_auth" = [])),
    params(("band_id" = String, Path, description = "Band ID")),
    responses(
        (status = 200, description = "Band roster", body = ApiResponse<Vec<MemberDto>>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not a member of this band")
    )
)]
pub async fn list_members(
    State(state): State<BandHandlerState>,
    RequireMember(_membership): RequireMember,
    Path(band_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<MemberDto>>>, DomainError> {
    let members = state.repos.memberships().list_members(&band_id).await?;

    Ok(Json(ApiResponse::success(
        members.into_iter().map(MemberDto::from).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/api/bands/{band_id}/members",
    tag = "Bands",
    security(("bearer_auth" = [])),
    params(("band_id" = String, Path, description = "Band ID")),
    request_body = AddMemberRequest,
    responses(
        (status = 201, description = "Member added", body = ApiResponse<MemberDto>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not a band admin"),
        (status = 404, description = "No user with that email"),
        (status = 409, description = "Already a member")
    )
)]
pub async fn add_member(
    State(state): State<BandHandlerState>,
    RequireAdmin(_membership): RequireAdmin,
    Path(band_id): Path<String>,
    ValidatedJson(request): ValidatedJson<AddMemberRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MemberDto>>), DomainError> {
    let user = state
        .repos
        .users()
        .find_by_email(&request.email)
        .await?
        .ok_or(DomainError::NotFound {
            entity: "User",
            field: "email",
            value: request.email,
        })?;

    let edge = state
        .repos
        .memberships()
        .add_member(&band_id, &user.id, request.role)
        .await?;

    tracing::info!(band_id = %band_id, user_id = %user.id, role = %edge.role.as_str(), "Member added");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(MemberDto {
            user_id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            role: edge.role,
            joined_at: edge.created_at,
        })),
    ))
}
