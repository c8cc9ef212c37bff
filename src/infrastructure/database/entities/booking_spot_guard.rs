//! Per-spot lock row
//!
//! Every booking write that can claim a slot upserts this row first, which
//! serialises those writers per spot for the rest of the transaction.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "booking_spot_guards")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub spot_id: Uuid,
    pub version: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
