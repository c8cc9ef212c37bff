//! Repository access for the domain layer
//!
//! `RepositoryProvider` bundles the booking store with the two read-only
//! collaborators the engine depends on. Every shared state the engine
//! touches is reached through it; nothing lives in process-wide statics.

use super::booking::BookingRepository;
use super::spot::SpotLookup;
use super::vehicle::VehicleLookup;

/// Provides access to all domain repositories.
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) {
///     let spot = repos.spots().get_spot(spot_id).await?;
///     let booking = repos.bookings().find_by_id(booking_id).await?;
/// }
/// ```
pub trait RepositoryProvider: Send + Sync {
    fn bookings(&self) -> &dyn BookingRepository;
    fn spots(&self) -> &dyn SpotLookup;
    fn vehicles(&self) -> &dyn VehicleLookup;
}
