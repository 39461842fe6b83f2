//! Create band_members table
//!
//! The unique index on (band_id, user_id) is what enforces "at most one
//! role per user per band", including under concurrent inserts.

use sea_orm_migration::prelude::*;

use super::m20240601_000001_create_users::Users;
use super::m20240601_000002_create_bands::Bands;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BandMembers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BandMembers::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BandMembers::BandId).string().not_null())
                    .col(ColumnDef::new(BandMembers::UserId).string().not_null())
                    .col(
                        ColumnDef::new(BandMembers::Role)
                            .string_len(20)
                            .not_null()
                            .default("member"),
                    )
                    .col(
                        ColumnDef::new(BandMembers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_band_members_band_id")
                            .from(BandMembers::Table, BandMembers::BandId)
                            .to(Bands::Table, Bands::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_band_members_user_id")
                            .from(BandMembers::Table, BandMembers::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One role per user per band
        manager
            .create_index(
                Index::create()
                    .name("idx_band_members_band_user")
                    .table(BandMembers::Table)
                    .col(BandMembers::BandId)
                    .col(BandMembers::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Guard lookups go through (band_id, user_id); listing a user's
        // bands goes through user_id alone
        manager
            .create_index(
                Index::create()
                    .name("idx_band_members_user_id")
                    .table(BandMembers::Table)
                    .col(BandMembers::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BandMembers::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum BandMembers {
    Table,
    Id,
    BandId,
    UserId,
    Role,
    CreatedAt,
}
