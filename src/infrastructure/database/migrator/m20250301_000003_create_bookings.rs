//! Create bookings table
//!
//! `idx_bookings_spot_status_window` backs the overlap query run on every
//! create and confirm.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Bookings::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Bookings::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Bookings::RenterId).uuid().not_null())
                    .col(ColumnDef::new(Bookings::SpotId).uuid().not_null())
                    .col(ColumnDef::new(Bookings::VehicleId).uuid().not_null())
                    .col(
                        ColumnDef::new(Bookings::StartTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bookings::EndTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bookings::TotalHoursHundredths)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bookings::HourlyRateCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bookings::TotalPriceCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bookings::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Bookings::PaymentStatus)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Bookings::LicensePlate).string_len(20).not_null())
                    .col(ColumnDef::new(Bookings::VehicleMake).string_len(50))
                    .col(ColumnDef::new(Bookings::VehicleModel).string_len(50))
                    .col(ColumnDef::new(Bookings::VehicleColor).string_len(50))
                    .col(ColumnDef::new(Bookings::SpecialInstructions).text())
                    .col(
                        ColumnDef::new(Bookings::Version)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(Bookings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bookings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_spot_status_window")
                    .table(Bookings::Table)
                    .col(Bookings::SpotId)
                    .col(Bookings::Status)
                    .col(Bookings::StartTime)
                    .col(Bookings::EndTime)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_renter")
                    .table(Bookings::Table)
                    .col(Bookings::RenterId)
                    .col(Bookings::StartTime)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Bookings::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Bookings {
    Table,
    Id,
    RenterId,
    SpotId,
    VehicleId,
    StartTime,
    EndTime,
    TotalHoursHundredths,
    HourlyRateCents,
    TotalPriceCents,
    Status,
    PaymentStatus,
    LicensePlate,
    VehicleMake,
    VehicleModel,
    VehicleColor,
    SpecialInstructions,
    Version,
    CreatedAt,
    UpdatedAt,
}
