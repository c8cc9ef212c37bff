//! Create vehicles table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Vehicles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Vehicles::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Vehicles::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(Vehicles::LicensePlate).string_len(20).not_null())
                    .col(ColumnDef::new(Vehicles::Make).string_len(50))
                    .col(ColumnDef::new(Vehicles::Model).string_len(50))
                    .col(ColumnDef::new(Vehicles::Color).string_len(50))
                    .col(
                        ColumnDef::new(Vehicles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Vehicles::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Vehicles {
    Table,
    Id,
    OwnerId,
    LicensePlate,
    Make,
    Model,
    Color,
    CreatedAt,
}
