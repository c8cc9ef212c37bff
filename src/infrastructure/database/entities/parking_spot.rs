//! Parking spot read model
//!
//! Written by the listings subsystem; the booking engine only reads it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "parking_spots")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub owner_id: Uuid,
    pub title: String,
    pub hourly_rate_cents: i64,
    pub is_active: bool,

    /// "HH:MM"
    pub opens_at: String,
    /// "HH:MM", `24:00` allowed
    pub closes_at: String,
    /// Comma separated weekday names, empty for every day
    pub operating_days: String,

    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
