//! Create parking_spots table
//!
//! Read model of the listings subsystem: rate, active flag, weekly hours.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ParkingSpots::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ParkingSpots::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(ParkingSpots::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(ParkingSpots::Title).string().not_null())
                    .col(
                        ColumnDef::new(ParkingSpots::HourlyRateCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ParkingSpots::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(ParkingSpots::OpensAt)
                            .string()
                            .not_null()
                            .default("00:00"),
                    )
                    .col(
                        ColumnDef::new(ParkingSpots::ClosesAt)
                            .string()
                            .not_null()
                            .default("24:00"),
                    )
                    .col(
                        ColumnDef::new(ParkingSpots::OperatingDays)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(ParkingSpots::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_parking_spots_owner")
                    .table(ParkingSpots::Table)
                    .col(ParkingSpots::OwnerId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ParkingSpots::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum ParkingSpots {
    Table,
    Id,
    OwnerId,
    Title,
    HourlyRateCents,
    IsActive,
    OpensAt,
    ClosesAt,
    OperatingDays,
    CreatedAt,
}
