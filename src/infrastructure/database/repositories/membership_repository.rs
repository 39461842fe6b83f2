use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::domain::{
    BandRole, DomainError, DomainResult, MemberEntry, Membership, MembershipRepositoryInterface,
};
use crate::infrastructure::database::entities::{band_member, user};

pub struct SeaOrmMembershipRepository {
    db: DatabaseConnection,
}

impl SeaOrmMembershipRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn entity_role_to_domain(role: band_member::BandRole) -> BandRole {
    match role {
        band_member::BandRole::Member => BandRole::Member,
        band_member::BandRole::Admin => BandRole::Admin,
    }
}

fn domain_role_to_entity(role: BandRole) -> band_member::BandRole {
    match role {
        BandRole::Member => band_member::BandRole::Member,
        BandRole::Admin => band_member::BandRole::Admin,
    }
}

fn edge_model_to_domain(model: band_member::Model) -> Membership {
    Membership {
        id: model.id,
        band_id: model.band_id,
        user_id: model.user_id,
        role: entity_role_to_domain(model.role),
        created_at: model.created_at,
    }
}

fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::Database(e.to_string())
}

// ── Repository implementation ───────────────────────────────────

#[async_trait]
impl MembershipRepositoryInterface for SeaOrmMembershipRepository {
    async fn find_edge(
        &self,
        band_id: &str,
        user_id: &str,
    ) -> DomainResult<Option<Membership>> {
        let model = band_member::Entity::find()
            .filter(band_member::Column::BandId.eq(band_id))
            .filter(band_member::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(model.map(edge_model_to_domain))
    }

    async fn list_members(&self, band_id: &str) -> DomainResult<Vec<MemberEntry>> {
        let rows = band_member::Entity::find()
            .filter(band_member::Column::BandId.eq(band_id))
            .order_by_asc(band_member::Column::CreatedAt)
            .find_also_related(user::Entity)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let members = rows
            .into_iter()
            .filter_map(|(edge, user)| {
                user.map(|user| MemberEntry {
                    user_id: user.id,
                    email: user.email,
                    first_name: user.first_name,
                    last_name: user.last_name,
                    role: entity_role_to_domain(edge.role),
                    joined_at: edge.created_at,
                })
            })
            .collect();

        Ok(members)
    }

    async fn add_member(
        &self,
        band_id: &str,
        user_id: &str,
        role: BandRole,
    ) -> DomainResult<Membership> {
        let edge = band_member::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            band_id: Set(band_id.to_string()),
            user_id: Set(user_id.to_string()),
            role: Set(domain_role_to_entity(role)),
            created_at: Set(Utc::now()),
        };

        // The unique (band_id, user_id) index rejects a duplicate edge.
        let model = edge
            .insert(&self.db)
            .await
            .map_err(|e| DomainError::from_db(e, "User is already a member of this band"))?;

        Ok(edge_model_to_domain(model))
    }
}
