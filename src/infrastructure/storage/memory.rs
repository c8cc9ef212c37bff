//! In-memory implementations of every booking port
//!
//! Same semantics as the SeaORM store (per-spot serialised check-then-insert,
//! versioned updates) but only valid inside one process.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::booking::availability;
use crate::domain::booking::{Booking, BookingRepository, BookingStatus, StatusChange, TimeWindow};
use crate::domain::{
    BookingId, DomainError, DomainResult, LookupError, RepositoryProvider, SpotDetails, SpotId,
    SpotLookup, UserId, VehicleId, VehicleLookup,
};
use crate::shared::types::pagination::{Page, PageRequest};

/// Booking store for development and testing
#[derive(Default)]
pub struct InMemoryBookingRepository {
    bookings: DashMap<BookingId, Booking>,
    spot_locks: DashMap<SpotId, Arc<Mutex<()>>>,
}

impl InMemoryBookingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn spot_lock(&self, spot_id: SpotId) -> Arc<Mutex<()>> {
        self.spot_locks.entry(spot_id).or_default().clone()
    }

    fn blocking(
        &self,
        spot_id: SpotId,
        window: &TimeWindow,
        exclude: Option<BookingId>,
    ) -> Vec<Booking> {
        self.bookings
            .iter()
            .filter(|e| e.spot_id == spot_id && availability::blocks(e.value(), window, exclude))
            .map(|e| e.value().clone())
            .collect()
    }

    fn page_of<F>(
        &self,
        filter: F,
        status: Option<BookingStatus>,
        page: PageRequest,
    ) -> Page<Booking>
    where
        F: Fn(&Booking) -> bool,
    {
        let mut matching: Vec<Booking> = self
            .bookings
            .iter()
            .filter(|e| filter(e.value()) && status.is_none_or(|s| e.status == s))
            .map(|e| e.value().clone())
            .collect();
        matching.sort_by(|a, b| {
            b.start_time
                .cmp(&a.start_time)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(page.limit).unwrap_or(usize::MAX))
            .collect();
        Page::new(items, total, page)
    }
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn find_by_id(&self, id: BookingId) -> DomainResult<Option<Booking>> {
        Ok(self.bookings.get(&id).map(|b| b.clone()))
    }

    async fn find_blocking(
        &self,
        spot_id: SpotId,
        window: &TimeWindow,
        exclude: Option<BookingId>,
    ) -> DomainResult<Vec<Booking>> {
        Ok(self.blocking(spot_id, window, exclude))
    }

    async fn insert_if_available(&self, booking: Booking) -> DomainResult<Booking> {
        let lock = self.spot_lock(booking.spot_id);
        let _guard = lock.lock().await;

        if !self.blocking(booking.spot_id, &booking.window(), None).is_empty() {
            return Err(DomainError::Conflict(
                "Parking spot is not available for the selected time".to_string(),
            ));
        }

        debug!(booking_id = %booking.id, spot_id = %booking.spot_id, "Inserting booking");
        self.bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn apply_change(&self, change: StatusChange) -> DomainResult<Booking> {
        let lock = self.spot_lock(change.spot_id);
        let _guard = if change.claims_slot {
            Some(lock.lock().await)
        } else {
            None
        };

        if change.claims_slot {
            let window = self
                .bookings
                .get(&change.booking_id)
                .map(|b| b.window())
                .ok_or_else(|| DomainError::not_found("Booking", change.booking_id))?;
            if !self
                .blocking(change.spot_id, &window, Some(change.booking_id))
                .is_empty()
            {
                return Err(DomainError::Conflict(
                    "Another booking already holds this time slot".to_string(),
                ));
            }
        }

        let mut entry = self
            .bookings
            .get_mut(&change.booking_id)
            .ok_or_else(|| DomainError::not_found("Booking", change.booking_id))?;
        if entry.version != change.expected_version {
            return Err(DomainError::ConcurrentModification(change.booking_id));
        }

        if let Some(status) = change.status {
            entry.status = status;
        }
        if let Some(payment_status) = change.payment_status {
            entry.payment_status = payment_status;
        }
        entry.version += 1;
        entry.updated_at = change.at;
        Ok(entry.clone())
    }

    async fn list_by_renter(
        &self,
        renter_id: UserId,
        status: Option<BookingStatus>,
        page: PageRequest,
    ) -> DomainResult<Page<Booking>> {
        Ok(self.page_of(|b| b.renter_id == renter_id, status, page))
    }

    async fn list_by_spots(
        &self,
        spot_ids: &[SpotId],
        status: Option<BookingStatus>,
        page: PageRequest,
    ) -> DomainResult<Page<Booking>> {
        Ok(self.page_of(|b| spot_ids.contains(&b.spot_id), status, page))
    }
}

/// Spot and vehicle directory backed by maps.
///
/// `set_unavailable(true)` makes every lookup fail, to exercise collaborator
/// failure paths.
#[derive(Default)]
pub struct InMemoryDirectory {
    spots: DashMap<SpotId, SpotDetails>,
    vehicles: DashMap<VehicleId, UserId>,
    unavailable: AtomicBool,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_spot(&self, spot: SpotDetails) {
        self.spots.insert(spot.id, spot);
    }

    pub fn add_vehicle(&self, vehicle_id: VehicleId, owner_id: UserId) {
        self.vehicles.insert(vehicle_id, owner_id);
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_up(&self) -> Result<(), LookupError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(LookupError::Backend("directory unavailable".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SpotLookup for InMemoryDirectory {
    async fn get_spot(&self, spot_id: SpotId) -> Result<Option<SpotDetails>, LookupError> {
        self.check_up()?;
        Ok(self.spots.get(&spot_id).map(|s| s.clone()))
    }

    async fn spots_owned_by(&self, owner_id: UserId) -> Result<Vec<SpotId>, LookupError> {
        self.check_up()?;
        Ok(self
            .spots
            .iter()
            .filter(|s| s.owner_id == owner_id)
            .map(|s| s.id)
            .collect())
    }
}

#[async_trait]
impl VehicleLookup for InMemoryDirectory {
    async fn get_vehicle_owner(
        &self,
        vehicle_id: VehicleId,
    ) -> Result<Option<UserId>, LookupError> {
        self.check_up()?;
        Ok(self.vehicles.get(&vehicle_id).map(|o| *o))
    }
}

/// [`RepositoryProvider`] over the in-memory store
#[derive(Default)]
pub struct InMemoryRepositoryProvider {
    bookings: InMemoryBookingRepository,
    directory: InMemoryDirectory,
}

impl InMemoryRepositoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed spots and vehicles
    pub fn directory(&self) -> &InMemoryDirectory {
        &self.directory
    }
}

impl RepositoryProvider for InMemoryRepositoryProvider {
    fn bookings(&self) -> &dyn BookingRepository {
        &self.bookings
    }

    fn spots(&self) -> &dyn SpotLookup {
        &self.directory
    }

    fn vehicles(&self) -> &dyn VehicleLookup {
        &self.directory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::booking::PaymentStatus;
    use crate::shared::testing::{at, booking, day_before};
    use uuid::Uuid;

    fn change(b: &Booking, status: BookingStatus) -> StatusChange {
        StatusChange {
            booking_id: b.id,
            spot_id: b.spot_id,
            expected_version: b.version,
            status: Some(status),
            payment_status: None,
            claims_slot: status.blocks_slot() && !b.status.blocks_slot(),
            at: day_before(),
        }
    }

    #[tokio::test]
    async fn overlapping_insert_conflicts() {
        let repo = InMemoryBookingRepository::new();
        let spot = Uuid::new_v4();
        repo.insert_if_available(booking(spot, 10, 12, BookingStatus::Confirmed))
            .await
            .unwrap();

        let err = repo
            .insert_if_available(booking(spot, 11, 13, BookingStatus::Confirmed))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        // other spot or adjacent window: fine
        repo.insert_if_available(booking(Uuid::new_v4(), 11, 13, BookingStatus::Confirmed))
            .await
            .unwrap();
        repo.insert_if_available(booking(spot, 12, 14, BookingStatus::Confirmed))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn concurrent_inserts_admit_one() {
        let repo = Arc::new(InMemoryBookingRepository::new());
        let spot = Uuid::new_v4();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let repo = repo.clone();
                tokio::spawn(async move {
                    repo.insert_if_available(booking(spot, 10, 12, BookingStatus::Confirmed))
                        .await
                })
            })
            .collect();

        let mut ok = 0;
        for h in handles {
            if h.await.unwrap().is_ok() {
                ok += 1;
            }
        }
        assert_eq!(ok, 1);
    }

    #[tokio::test]
    async fn stale_version_is_rejected() {
        let repo = InMemoryBookingRepository::new();
        let b = repo
            .insert_if_available(booking(Uuid::new_v4(), 10, 12, BookingStatus::Confirmed))
            .await
            .unwrap();

        let updated = repo.apply_change(change(&b, BookingStatus::Active)).await.unwrap();
        assert_eq!(updated.status, BookingStatus::Active);
        assert_eq!(updated.version, b.version + 1);

        let err = repo
            .apply_change(change(&b, BookingStatus::Cancelled))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ConcurrentModification(id) if id == b.id));
    }

    #[tokio::test]
    async fn confirming_rechecks_the_slot() {
        let repo = InMemoryBookingRepository::new();
        let spot = Uuid::new_v4();
        let first = repo
            .insert_if_available(booking(spot, 10, 12, BookingStatus::Pending))
            .await
            .unwrap();
        let second = repo
            .insert_if_available(booking(spot, 11, 13, BookingStatus::Pending))
            .await
            .unwrap();

        repo.apply_change(change(&first, BookingStatus::Confirmed))
            .await
            .unwrap();
        let err = repo
            .apply_change(change(&second, BookingStatus::Confirmed))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn payment_only_change_keeps_status() {
        let repo = InMemoryBookingRepository::new();
        let b = repo
            .insert_if_available(booking(Uuid::new_v4(), 10, 12, BookingStatus::Pending))
            .await
            .unwrap();
        let updated = repo
            .apply_change(StatusChange {
                status: None,
                payment_status: Some(PaymentStatus::Paid),
                claims_slot: false,
                ..change(&b, BookingStatus::Pending)
            })
            .await
            .unwrap();
        assert_eq!(updated.status, BookingStatus::Pending);
        assert_eq!(updated.payment_status, PaymentStatus::Paid);
    }

    #[tokio::test]
    async fn lists_newest_start_first_with_filter() {
        let repo = InMemoryBookingRepository::new();
        let spot = Uuid::new_v4();
        let renter = Uuid::new_v4();
        for (start, status) in [
            (8, BookingStatus::Pending),
            (14, BookingStatus::Confirmed),
            (11, BookingStatus::Pending),
        ] {
            let mut b = booking(spot, start, start + 1, status);
            b.renter_id = renter;
            repo.insert_if_available(b).await.unwrap();
        }

        let page = repo
            .list_by_renter(renter, None, PageRequest::new(Some(1), Some(2)))
            .await
            .unwrap();
        assert_eq!(page.total, 3);
        assert!(page.has_next);
        assert_eq!(page.items[0].start_time, at(14, 0));
        assert_eq!(page.items[1].start_time, at(11, 0));

        let pending = repo
            .list_by_spots(&[spot], Some(BookingStatus::Pending), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(pending.total, 2);
        assert!(pending.items.iter().all(|b| b.status == BookingStatus::Pending));
    }

    #[tokio::test]
    async fn unavailable_directory_fails_lookups() {
        let dir = InMemoryDirectory::new();
        dir.set_unavailable(true);
        assert!(dir.get_spot(Uuid::new_v4()).await.is_err());
        assert!(dir.get_vehicle_owner(Uuid::new_v4()).await.is_err());
    }
}
