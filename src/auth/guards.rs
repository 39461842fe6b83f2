//! Band-scoped authorization guards
//!
//! Extractors that run after the session resolver: they read the resolved
//! identity from request extensions and the `band_id` path parameter, look
//! up the membership edge, and either hand the edge to the handler or
//! short-circuit with a 403. Absence of an edge is always a deny; the
//! response never reveals whether the band exists.

use axum::{
    extract::{FromRef, FromRequestParts, Path},
    http::request::Parts,
    response::Response,
};
use serde::Deserialize;

use super::jwt::AuthError;
use super::middleware::{auth_error_response, internal_error_response, AuthState, CurrentUser};
use crate::domain::Membership;

#[derive(Deserialize)]
struct BandKey {
    band_id: String,
}

/// Allows any membership role on the band named in the path.
///
/// Hands the resolved edge (role, join metadata) to the handler so it does
/// not repeat the lookup.
pub struct RequireMember(pub Membership);

/// Allows only the admin role on the band named in the path. A plain
/// member and a non-member are denied alike.
pub struct RequireAdmin(pub Membership);

async fn resolve_edge<S>(parts: &mut Parts, state: &S) -> Result<Option<Membership>, Response>
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    let auth_state = AuthState::from_ref(state);

    // The session resolver must have run first
    let Some(user) = parts.extensions.get::<CurrentUser>().cloned() else {
        return Err(auth_error_response(&AuthError::MissingToken));
    };

    let Path(BandKey { band_id }) = Path::from_request_parts(parts, state)
        .await
        .map_err(|e| {
            tracing::error!("Band guard on a route without band_id: {}", e);
            internal_error_response()
        })?;

    auth_state
        .repos
        .memberships()
        .find_edge(&band_id, &user.id)
        .await
        .map_err(|e| {
            tracing::error!("Membership lookup failed: {}", e);
            internal_error_response()
        })
}

impl<S> FromRequestParts<S> for RequireMember
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match resolve_edge(parts, state).await? {
            Some(edge) => Ok(RequireMember(edge)),
            None => Err(auth_error_response(&AuthError::NotBandMember)),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Absent edge and member-but-not-admin are denied alike
        match resolve_edge(parts, state).await? {
            Some(edge) if edge.role.is_admin() => Ok(RequireAdmin(edge)),
            _ => Err(auth_error_response(&AuthError::NotBandAdmin)),
        }
    }
}
