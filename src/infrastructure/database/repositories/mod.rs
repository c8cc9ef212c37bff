//! Database repository implementations
//!
//! SeaORM booking store, collaborator lookups and the unified RepositoryProvider.

pub mod booking_repository;
pub mod lookup;
pub mod repository_provider;

pub use booking_repository::SeaOrmBookingRepository;
pub use lookup::{SeaOrmSpotLookup, SeaOrmVehicleLookup};
pub use repository_provider::SeaOrmRepositoryProvider;
