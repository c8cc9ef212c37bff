//! SeaORM implementation of RepositoryProvider

use std::time::Duration;

use sea_orm::DatabaseConnection;

use crate::domain::{BookingRepository, RepositoryProvider, SpotLookup, VehicleLookup};

use super::booking_repository::SeaOrmBookingRepository;
use super::lookup::{SeaOrmSpotLookup, SeaOrmVehicleLookup};

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool; lookups share `lookup_timeout`.
///
/// ```ignore
/// let repos = SeaOrmRepositoryProvider::new(db.clone(), Duration::from_secs(2));
/// let booking = repos.bookings().find_by_id(id).await?;
/// ```
pub struct SeaOrmRepositoryProvider {
    bookings: SeaOrmBookingRepository,
    spots: SeaOrmSpotLookup,
    vehicles: SeaOrmVehicleLookup,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection, lookup_timeout: Duration) -> Self {
        Self {
            bookings: SeaOrmBookingRepository::new(db.clone()),
            spots: SeaOrmSpotLookup::new(db.clone(), lookup_timeout),
            vehicles: SeaOrmVehicleLookup::new(db, lookup_timeout),
        }
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn bookings(&self) -> &dyn BookingRepository {
        &self.bookings
    }

    fn spots(&self) -> &dyn SpotLookup {
        &self.spots
    }

    fn vehicles(&self) -> &dyn VehicleLookup {
        &self.vehicles
    }
}
