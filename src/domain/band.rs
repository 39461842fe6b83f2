//! Band aggregate: bands, membership edges, and their store contracts.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::DomainResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Band {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Role a user holds within one band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BandRole {
    Member,
    Admin,
}

impl Default for BandRole {
    fn default() -> Self {
        BandRole::Member
    }
}

impl BandRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            BandRole::Member => "member",
            BandRole::Admin => "admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, BandRole::Admin)
    }
}

/// A membership edge: one user in one band with exactly one role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    pub id: String,
    pub band_id: String,
    pub user_id: String,
    pub role: BandRole,
    pub created_at: DateTime<Utc>,
}

/// A member row joined with user identity, for listing a band's roster.
#[derive(Debug, Clone)]
pub struct MemberEntry {
    pub user_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: BandRole,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateBandDto {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UpdateBandDto {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[async_trait]
pub trait BandRepositoryInterface: Send + Sync {
    /// Create a band and an admin membership edge for its creator in one
    /// transaction; a band is never left without an admin.
    async fn create_with_admin(&self, dto: CreateBandDto, creator_id: &str)
        -> DomainResult<Band>;

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Band>>;
    async fn update_band(&self, id: &str, dto: UpdateBandDto) -> DomainResult<Option<Band>>;
}

/// Membership Store contract consulted by the authorization guards.
#[async_trait]
pub trait MembershipRepositoryInterface: Send + Sync {
    /// The edge for (band, user), if any. Read-only; absence is a deny,
    /// never an implicit grant.
    async fn find_edge(&self, band_id: &str, user_id: &str)
        -> DomainResult<Option<Membership>>;

    async fn list_members(&self, band_id: &str) -> DomainResult<Vec<MemberEntry>>;

    /// Insert a new edge. A duplicate (band, user) pair surfaces as
    /// `DomainError::Conflict` via the unique index.
    async fn add_member(
        &self,
        band_id: &str,
        user_id: &str,
        role: BandRole,
    ) -> DomainResult<Membership>;
}
