//! User aggregate: identity record and the Credential Store contract.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::shared::DomainResult;

/// A registered user.
///
/// Carries the password hash for credential verification; anything that
/// leaves the process goes through a stripped representation instead
/// (`auth::middleware::CurrentUser`, `UserProfile` DTO).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for creating a user. The password is already hashed by the
/// caller; plaintext never crosses this boundary.
#[derive(Debug, Clone)]
pub struct CreateUserDto {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
}

/// Credential Store contract. Email uniqueness is enforced atomically by
/// the implementation; a concurrent duplicate insert surfaces as
/// `DomainError::Conflict`.
#[async_trait]
pub trait UserRepositoryInterface: Send + Sync {
    async fn create_user(&self, dto: CreateUserDto) -> DomainResult<User>;

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>>;
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<User>>;
}
