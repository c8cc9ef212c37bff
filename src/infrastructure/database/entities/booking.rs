//! Booking entity
//!
//! Money is stored in cents and hours in hundredths of an hour.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub renter_id: Uuid,
    pub spot_id: Uuid,
    pub vehicle_id: Uuid,

    pub start_time: DateTimeUtc,
    pub end_time: DateTimeUtc,

    pub total_hours_hundredths: i64,
    pub hourly_rate_cents: i64,
    pub total_price_cents: i64,

    /// pending, confirmed, active, completed, cancelled
    pub status: String,
    /// pending, paid, failed, refunded
    pub payment_status: String,

    pub license_plate: String,
    #[sea_orm(nullable)]
    pub vehicle_make: Option<String>,
    #[sea_orm(nullable)]
    pub vehicle_model: Option<String>,
    #[sea_orm(nullable)]
    pub vehicle_color: Option<String>,

    #[sea_orm(nullable)]
    pub special_instructions: Option<String>,

    pub version: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
