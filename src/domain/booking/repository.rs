//! Booking repository interface

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::model::{Booking, BookingStatus, PaymentStatus};
use super::window::TimeWindow;
use crate::domain::{BookingId, DomainResult, SpotId, UserId};
use crate::shared::types::pagination::{Page, PageRequest};

/// A status and/or payment-status write against a known booking version.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub booking_id: BookingId,
    pub spot_id: SpotId,
    /// Version the caller read; the write fails if it moved on
    pub expected_version: i32,
    pub status: Option<BookingStatus>,
    pub payment_status: Option<PaymentStatus>,
    /// Re-check availability under the spot lock before applying
    pub claims_slot: bool,
    pub at: DateTime<Utc>,
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Find booking by ID
    async fn find_by_id(&self, id: BookingId) -> DomainResult<Option<Booking>>;

    /// Confirmed/active bookings on `spot_id` overlapping `window`
    async fn find_blocking(
        &self,
        spot_id: SpotId,
        window: &TimeWindow,
        exclude: Option<BookingId>,
    ) -> DomainResult<Vec<Booking>>;

    /// Insert a new booking if no blocking booking overlaps it.
    ///
    /// The check and the insert are atomic with respect to every other
    /// writer on the same spot. Fails with `Conflict` otherwise.
    async fn insert_if_available(&self, booking: Booking) -> DomainResult<Booking>;

    /// Apply a change if the stored version still equals
    /// `expected_version`, otherwise `ConcurrentModification`.
    async fn apply_change(&self, change: StatusChange) -> DomainResult<Booking>;

    /// Bookings made by a renter, newest start first
    async fn list_by_renter(
        &self,
        renter_id: UserId,
        status: Option<BookingStatus>,
        page: PageRequest,
    ) -> DomainResult<Page<Booking>>;

    /// Bookings on any of `spot_ids`, newest start first
    async fn list_by_spots(
        &self,
        spot_ids: &[SpotId],
        status: Option<BookingStatus>,
        page: PageRequest,
    ) -> DomainResult<Page<Booking>>;
}
