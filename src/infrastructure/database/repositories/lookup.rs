//! SeaORM-backed spot and vehicle lookups
//!
//! Every query is bounded by the configured lookup timeout. Failures are
//! reported to the caller as `LookupError` and never retried here.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QuerySelect};

use crate::domain::booking::pricing::from_hundredths;
use crate::domain::{
    LookupError, OperatingSchedule, SpotDetails, SpotId, SpotLookup, UserId, VehicleId,
    VehicleLookup,
};
use crate::infrastructure::database::entities::{parking_spot, vehicle};

async fn bounded<T, F>(timeout: Duration, query: F) -> Result<T, LookupError>
where
    F: Future<Output = Result<T, DbErr>>,
{
    match tokio::time::timeout(timeout, query).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(LookupError::Backend(e.to_string())),
        Err(_) => Err(LookupError::Timeout(timeout.as_millis() as u64)),
    }
}

fn spot_to_domain(m: parking_spot::Model) -> Result<SpotDetails, LookupError> {
    let days: Vec<&str> = m
        .operating_days
        .split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .collect();
    let schedule = OperatingSchedule::parse(&m.opens_at, &m.closes_at, &days).map_err(|e| {
        LookupError::Backend(format!("spot {} has an invalid schedule: {e}", m.id))
    })?;

    Ok(SpotDetails {
        id: m.id,
        owner_id: m.owner_id,
        title: m.title,
        hourly_rate: from_hundredths(m.hourly_rate_cents),
        active: m.is_active,
        schedule,
    })
}

pub struct SeaOrmSpotLookup {
    db: DatabaseConnection,
    timeout: Duration,
}

impl SeaOrmSpotLookup {
    pub fn new(db: DatabaseConnection, timeout: Duration) -> Self {
        Self { db, timeout }
    }
}

#[async_trait]
impl SpotLookup for SeaOrmSpotLookup {
    async fn get_spot(&self, spot_id: SpotId) -> Result<Option<SpotDetails>, LookupError> {
        bounded(self.timeout, parking_spot::Entity::find_by_id(spot_id).one(&self.db))
            .await?
            .map(spot_to_domain)
            .transpose()
    }

    async fn spots_owned_by(&self, owner_id: UserId) -> Result<Vec<SpotId>, LookupError> {
        bounded(
            self.timeout,
            parking_spot::Entity::find()
                .select_only()
                .column(parking_spot::Column::Id)
                .filter(parking_spot::Column::OwnerId.eq(owner_id))
                .into_tuple::<SpotId>()
                .all(&self.db),
        )
        .await
    }
}

pub struct SeaOrmVehicleLookup {
    db: DatabaseConnection,
    timeout: Duration,
}

impl SeaOrmVehicleLookup {
    pub fn new(db: DatabaseConnection, timeout: Duration) -> Self {
        Self { db, timeout }
    }
}

#[async_trait]
impl VehicleLookup for SeaOrmVehicleLookup {
    async fn get_vehicle_owner(
        &self,
        vehicle_id: VehicleId,
    ) -> Result<Option<UserId>, LookupError> {
        let found = bounded(
            self.timeout,
            vehicle::Entity::find_by_id(vehicle_id).one(&self.db),
        )
        .await?;
        Ok(found.map(|v| v.owner_id))
    }
}
