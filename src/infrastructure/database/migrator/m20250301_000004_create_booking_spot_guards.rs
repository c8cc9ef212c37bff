//! Create booking_spot_guards table
//!
//! One row per spot that has ever been booked. Writers upsert their spot's
//! row at the start of a transaction to serialise with each other.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BookingSpotGuards::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BookingSpotGuards::SpotId)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BookingSpotGuards::Version)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BookingSpotGuards::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum BookingSpotGuards {
    Table,
    SpotId,
    Version,
}
