//! Domain layer
//!
//! Core models and the store contracts the service depends on. The
//! concrete SeaORM implementations live in `infrastructure::database`.

pub mod band;
pub mod user;

pub use band::{
    Band, BandRepositoryInterface, BandRole, CreateBandDto, MemberEntry, Membership,
    MembershipRepositoryInterface, UpdateBandDto,
};
pub use user::{CreateUserDto, User, UserRepositoryInterface};

pub use crate::shared::{DomainError, DomainResult};

/// Unified accessor for all repositories, held once per process.
pub trait RepositoryProvider: Send + Sync {
    fn users(&self) -> &dyn UserRepositoryInterface;
    fn bands(&self) -> &dyn BandRepositoryInterface;
    fn memberships(&self) -> &dyn MembershipRepositoryInterface;
}
