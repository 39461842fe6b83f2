//! SeaORM implementation of RepositoryProvider

use sea_orm::DatabaseConnection;

use crate::domain::{
    BandRepositoryInterface, MembershipRepositoryInterface, RepositoryProvider,
    UserRepositoryInterface,
};

use super::band_repository::SeaOrmBandRepository;
use super::membership_repository::SeaOrmMembershipRepository;
use super::user_repository::SeaOrmUserRepository;

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool and exposes per-aggregate repository accessors.
pub struct SeaOrmRepositoryProvider {
    users: SeaOrmUserRepository,
    bands: SeaOrmBandRepository,
    memberships: SeaOrmMembershipRepository,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            users: SeaOrmUserRepository::new(db.clone()),
            bands: SeaOrmBandRepository::new(db.clone()),
            memberships: SeaOrmMembershipRepository::new(db),
        }
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn users(&self) -> &dyn UserRepositoryInterface {
        &self.users
    }

    fn bands(&self) -> &dyn BandRepositoryInterface {
        &self.bands
    }

    fn memberships(&self) -> &dyn MembershipRepositoryInterface {
        &self.memberships
    }
}
