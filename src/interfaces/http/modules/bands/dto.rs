//! Band DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::{Band, BandRole, MemberEntry};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBandRequest {
    #[validate(length(min = 1, max = 255, message = "band name is required"))]
    pub name: String,
    #[validate(length(max = 2000, message = "description is too long"))]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBandRequest {
    #[validate(length(min = 1, max = 255, message = "band name must not be empty"))]
    pub name: Option<String>,
    #[validate(length(max = 2000, message = "description is too long"))]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddMemberRequest {
    #[validate(email(message = "invalid email format"))]
    pub email: String,
    #[serde(default)]
    pub role: BandRole,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BandDto {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Band> for BandDto {
    fn from(band: Band) -> Self {
        Self {
            id: band.id,
            name: band.name,
            description: band.description,
            created_at: band.created_at,
            updated_at: band.updated_at,
        }
    }
}

/// A band as seen by one of its members: the band plus the caller's own
/// role, taken from the membership edge the guard already resolved.
#[derive(Debug, Serialize, ToSchema)]
pub struct BandDetail {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub role: BandRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BandDetail {
    pub fn new(band: Band, role: BandRole) -> Self {
        Self {
            id: band.id,
            name: band.name,
            description: band.description,
            role,
            created_at: band.created_at,
            updated_at: band.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MemberDto {
    pub user_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: BandRole,
    pub joined_at: DateTime<Utc>,
}

impl From<MemberEntry> for MemberDto {
    fn from(entry: MemberEntry) -> Self {
        Self {
            user_id: entry.user_id,
            email: entry.email,
            first_name: entry.first_name,
            last_name: entry.last_name,
            role: entry.role,
            joined_at: entry.joined_at,
        }
    }
}
