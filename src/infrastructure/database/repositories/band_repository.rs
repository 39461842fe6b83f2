use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, Set, TransactionTrait,
};

use crate::domain::{
    Band, BandRepositoryInterface, CreateBandDto, DomainError, DomainResult, UpdateBandDto,
};
use crate::infrastructure::database::entities::{band, band_member};

pub struct SeaOrmBandRepository {
    db: DatabaseConnection,
}

impl SeaOrmBandRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn band_model_to_domain(model: band::Model) -> Band {
    Band {
        id: model.id,
        name: model.name,
        description: model.description,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::Database(e.to_string())
}

#[async_trait]
impl BandRepositoryInterface for SeaOrmBandRepository {
    async fn create_with_admin(
        &self,
        dto: CreateBandDto,
        creator_id: &str,
    ) -> DomainResult<Band> {
        let now = Utc::now();
        let band_id = uuid::Uuid::new_v4().to_string();

        let txn = self.db.begin().await.map_err(db_err)?;

        let new_band = band::ActiveModel {
            id: Set(band_id.clone()),
            name: Set(dto.name),
            description: Set(dto.description),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let model = new_band.insert(&txn).await.map_err(db_err)?;

        let admin_edge = band_member::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            band_id: Set(band_id),
            user_id: Set(creator_id.to_string()),
            role: Set(band_member::BandRole::Admin),
            created_at: Set(now),
        };
        admin_edge.insert(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        Ok(band_model_to_domain(model))
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Band>> {
        let model = band::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(model.map(band_model_to_domain))
    }

    async fn update_band(&self, id: &str, dto: UpdateBandDto) -> DomainResult<Option<Band>> {
        let existing = band::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        let Some(existing) = existing else {
            return Ok(None);
        };

        let mut active: band::ActiveModel = existing.into();

        if let Some(name) = dto.name {
            active.name = Set(name);
        }
        if let Some(description) = dto.description {
            active.description = Set(Some(description));
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(&self.db).await.map_err(db_err)?;

        Ok(Some(band_model_to_domain(updated)))
    }
}
