//! Booking lifecycle service
//!
//! Orchestrates window validation, collaborator lookups, pricing and the
//! state machine. All validation runs before any write; the only writes go
//! through [`BookingRepository::insert_if_available`] and
//! [`BookingRepository::apply_change`].
//!
//! [`BookingRepository::insert_if_available`]: crate::domain::BookingRepository::insert_if_available
//! [`BookingRepository::apply_change`]: crate::domain::BookingRepository::apply_change

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use super::availability::AvailabilityOracle;
use crate::domain::booking::state_machine::authorize_transition;
use crate::domain::booking::window::{validate_against_schedule, validate_window};
use crate::domain::booking::{
    pricing, Booking, BookingStatus, CancellationWindow, NewBooking, Party, PaymentStatus,
    StatusChange, TimeWindow, VehicleInfo, WindowRules,
};
use crate::domain::{
    BookingId, Caller, DomainError, DomainResult, RepositoryProvider, SpotDetails, SpotId,
    ValidationReason, VehicleId,
};
use crate::shared::time::SharedClock;
use crate::shared::types::pagination::{Page, PageRequest};
use crate::shared::validations::normalize_optional_text;

/// Tunable booking rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingPolicy {
    pub window_rules: WindowRules,
    pub cancellation_window: CancellationWindow,
    pub max_special_instructions: usize,
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            window_rules: WindowRules::default(),
            cancellation_window: CancellationWindow::default(),
            max_special_instructions: 500,
        }
    }
}

/// Vehicle snapshot as submitted, before normalisation
#[derive(Debug, Clone, Default)]
pub struct VehicleInfoInput {
    pub license_plate: String,
    pub make: Option<String>,
    pub model: Option<String>,
    pub color: Option<String>,
}

/// Create-booking request
#[derive(Debug, Clone)]
pub struct CreateBooking {
    pub spot_id: SpotId,
    pub vehicle_id: VehicleId,
    pub window: TimeWindow,
    pub vehicle_info: VehicleInfoInput,
    pub special_instructions: Option<String>,
}

/// Status and/or payment-status update request
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusUpdate {
    pub status: Option<BookingStatus>,
    pub payment_status: Option<PaymentStatus>,
}

/// A booking with its spot resolved for display.
///
/// `spot` is `None` when the spot has since been removed.
#[derive(Debug, Clone)]
pub struct BookingView {
    pub booking: Booking,
    pub spot: Option<SpotDetails>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AvailabilityReport {
    pub spot_id: SpotId,
    pub window: TimeWindow,
    pub available: bool,
    /// Windows of the bookings in the way
    pub conflicts: Vec<TimeWindow>,
}

/// Service for booking operations
pub struct BookingService {
    repos: Arc<dyn RepositoryProvider>,
    oracle: AvailabilityOracle,
    policy: BookingPolicy,
    clock: SharedClock,
}

impl BookingService {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        policy: BookingPolicy,
        clock: SharedClock,
    ) -> Self {
        Self {
            oracle: AvailabilityOracle::new(repos.clone()),
            repos,
            policy,
            clock,
        }
    }

    pub fn policy(&self) -> &BookingPolicy {
        &self.policy
    }

    pub async fn create(
        &self,
        caller: &Caller,
        request: CreateBooking,
    ) -> DomainResult<BookingView> {
        let now = self.clock.now();
        validate_window(&request.window, now, &self.policy.window_rules)?;

        let input = &request.vehicle_info;
        let vehicle_info = VehicleInfo::new(
            &input.license_plate,
            input.make.as_deref(),
            input.model.as_deref(),
            input.color.as_deref(),
        )?;
        let special_instructions = self.check_instructions(request.special_instructions)?;

        let spot = self.require_spot(request.spot_id).await?;
        if spot.owner_id == caller.user_id {
            return Err(DomainError::SelfBookingRejected);
        }
        if !spot.active {
            return Err(DomainError::validation("spot_id", ValidationReason::SpotInactive));
        }
        validate_against_schedule(&request.window, &spot.schedule)?;

        self.check_vehicle_owner(caller, request.vehicle_id).await?;

        let quote = pricing::compute(&request.window, spot.hourly_rate);
        let booking = Booking::pending(
            NewBooking {
                renter_id: caller.user_id,
                spot_id: spot.id,
                vehicle_id: request.vehicle_id,
                window: request.window,
                hourly_rate: spot.hourly_rate,
                quote,
                vehicle_info,
                special_instructions,
            },
            now,
        );

        let booking = match self.repos.bookings().insert_if_available(booking).await {
            Ok(b) => b,
            Err(e @ DomainError::Conflict(_)) => {
                metrics::counter!("booking_conflicts_total").increment(1);
                warn!(
                    spot_id = %spot.id,
                    renter_id = %caller.user_id,
                    start = %request.window.start,
                    end = %request.window.end,
                    "Booking rejected: slot taken"
                );
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        metrics::counter!("bookings_created_total").increment(1);
        info!(
            booking_id = %booking.id,
            spot_id = %booking.spot_id,
            renter_id = %booking.renter_id,
            total_hours = %booking.total_hours,
            total_price = %booking.total_price,
            "Booking created"
        );

        Ok(BookingView {
            booking,
            spot: Some(spot),
        })
    }

    /// Visible to the renter and the spot owner only.
    pub async fn get(&self, caller: &Caller, booking_id: BookingId) -> DomainResult<BookingView> {
        let booking = self.require_booking(booking_id).await?;
        let spot = self.lookup_spot(booking.spot_id).await?;

        if Party::of(caller.user_id, &booking, spot.as_ref().map(|s| s.owner_id)).is_none() {
            return Err(DomainError::AccessDenied(
                "Not authorized to view this booking".to_string(),
            ));
        }

        Ok(BookingView { booking, spot })
    }

    pub async fn list_for_renter(
        &self,
        caller: &Caller,
        status: Option<BookingStatus>,
        page: PageRequest,
    ) -> DomainResult<Page<Booking>> {
        self.repos
            .bookings()
            .list_by_renter(caller.user_id, status, page)
            .await
    }

    /// Bookings on every spot the caller owns.
    pub async fn list_for_owner(
        &self,
        caller: &Caller,
        status: Option<BookingStatus>,
        page: PageRequest,
    ) -> DomainResult<Page<Booking>> {
        if !caller.role.can_host() {
            return Err(DomainError::AccessDenied(
                "Only hosts can view bookings on their spots".to_string(),
            ));
        }

        let spot_ids = self
            .repos
            .spots()
            .spots_owned_by(caller.user_id)
            .await
            .map_err(|e| e.into_domain("Spot"))?;
        if spot_ids.is_empty() {
            return Ok(Page::empty(page));
        }

        self.repos.bookings().list_by_spots(&spot_ids, status, page).await
    }

    /// Apply a status transition and/or a payment-status change.
    ///
    /// A request that changes nothing succeeds without writing.
    pub async fn update_status(
        &self,
        caller: &Caller,
        booking_id: BookingId,
        update: StatusUpdate,
    ) -> DomainResult<BookingView> {
        let booking = self.require_booking(booking_id).await?;
        let spot = self.lookup_spot(booking.spot_id).await?;
        let party = Party::of(caller.user_id, &booking, spot.as_ref().map(|s| s.owner_id))
            .ok_or_else(|| {
                DomainError::AccessDenied("Not authorized to update this booking".to_string())
            })?;

        if update.payment_status == Some(PaymentStatus::Pending) {
            return Err(DomainError::validation(
                "payment_status",
                ValidationReason::InvalidPaymentStatus,
            ));
        }

        let now = self.clock.now();
        if let Some(to) = update.status {
            let transition = authorize_transition(party, booking.status, to)?;
            if transition.guarded_by_window {
                self.policy.cancellation_window.check(booking.start_time, now)?;
            }
        }

        let payment_status = update
            .payment_status
            .filter(|p| *p != booking.payment_status);
        if update.status.is_none() && payment_status.is_none() {
            return Ok(BookingView { booking, spot });
        }

        let booking = self
            .write_change(&booking, update.status, payment_status, now)
            .await?;
        Ok(BookingView { booking, spot })
    }

    /// Renter-initiated cancellation of a pending or confirmed booking,
    /// allowed until the cancellation window before start.
    pub async fn cancel(&self, caller: &Caller, booking_id: BookingId) -> DomainResult<Booking> {
        let booking = self.require_booking(booking_id).await?;
        if booking.renter_id != caller.user_id {
            return Err(DomainError::AccessDenied(
                "Only the renter can cancel this booking".to_string(),
            ));
        }
        if !matches!(booking.status, BookingStatus::Pending | BookingStatus::Confirmed) {
            return Err(DomainError::InvalidTransition {
                from: booking.status,
                to: BookingStatus::Cancelled,
            });
        }

        let now = self.clock.now();
        self.policy.cancellation_window.check(booking.start_time, now)?;

        let cancelled = self
            .write_change(&booking, Some(BookingStatus::Cancelled), None, now)
            .await?;
        metrics::counter!("booking_cancellations_total").increment(1);
        Ok(cancelled)
    }

    /// Whether `spot_id` is free for `window`, with the blocking windows.
    pub async fn check_availability(
        &self,
        spot_id: SpotId,
        window: TimeWindow,
    ) -> DomainResult<AvailabilityReport> {
        validate_window(&window, self.clock.now(), &self.policy.window_rules)?;
        self.require_spot(spot_id).await?;

        let conflicts = self.oracle.conflicts(spot_id, &window, None).await?;
        Ok(AvailabilityReport {
            spot_id,
            window,
            available: conflicts.is_empty(),
            conflicts,
        })
    }

    async fn write_change(
        &self,
        booking: &Booking,
        status: Option<BookingStatus>,
        payment_status: Option<PaymentStatus>,
        at: DateTime<Utc>,
    ) -> DomainResult<Booking> {
        let change = StatusChange {
            booking_id: booking.id,
            spot_id: booking.spot_id,
            expected_version: booking.version,
            status,
            payment_status,
            claims_slot: status.is_some_and(|s| s.blocks_slot() && !booking.status.blocks_slot()),
            at,
        };

        let updated = match self.repos.bookings().apply_change(change).await {
            Ok(b) => b,
            Err(e @ DomainError::Conflict(_)) => {
                metrics::counter!("booking_conflicts_total").increment(1);
                warn!(
                    booking_id = %booking.id,
                    spot_id = %booking.spot_id,
                    "Transition rejected: slot taken"
                );
                return Err(e);
            }
            Err(e @ DomainError::ConcurrentModification(_)) => {
                warn!(
                    booking_id = %booking.id,
                    version = booking.version,
                    "Stale booking write rejected"
                );
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        if let Some(to) = status {
            metrics::counter!("booking_transitions_total", "to" => to.as_str()).increment(1);
        }
        info!(
            booking_id = %updated.id,
            from = %booking.status,
            status = %updated.status,
            payment_status = %updated.payment_status,
            "Booking updated"
        );
        Ok(updated)
    }

    fn check_instructions(&self, text: Option<String>) -> DomainResult<Option<String>> {
        let text = normalize_optional_text(text);
        if text
            .as_ref()
            .is_some_and(|t| t.chars().count() > self.policy.max_special_instructions)
        {
            return Err(DomainError::validation(
                "special_instructions",
                ValidationReason::TooLong,
            ));
        }
        Ok(text)
    }

    async fn check_vehicle_owner(
        &self,
        caller: &Caller,
        vehicle_id: VehicleId,
    ) -> DomainResult<()> {
        let owner = self
            .repos
            .vehicles()
            .get_vehicle_owner(vehicle_id)
            .await
            .map_err(|e| e.into_domain("Vehicle"))?
            .ok_or_else(|| DomainError::not_found("Vehicle", vehicle_id))?;

        if owner != caller.user_id {
            return Err(DomainError::AccessDenied(
                "Vehicle does not belong to the renter".to_string(),
            ));
        }
        Ok(())
    }

    async fn require_booking(&self, booking_id: BookingId) -> DomainResult<Booking> {
        self.repos
            .bookings()
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Booking", booking_id))
    }

    async fn lookup_spot(&self, spot_id: SpotId) -> DomainResult<Option<SpotDetails>> {
        self.repos
            .spots()
            .get_spot(spot_id)
            .await
            .map_err(|e| e.into_domain("Spot"))
    }

    async fn require_spot(&self, spot_id: SpotId) -> DomainResult<SpotDetails> {
        self.lookup_spot(spot_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Parking spot", spot_id))
    }
}

impl BookingPolicy {
    /// Build from config-style numbers.
    pub fn from_limits(
        min_duration_hours: f64,
        max_duration_hours: f64,
        cancellation_window_minutes: i64,
        max_special_instructions: usize,
    ) -> Self {
        let hours = |h: f64| Duration::seconds((h * 3600.0).round() as i64);
        Self {
            window_rules: WindowRules {
                min_duration: hours(min_duration_hours),
                max_duration: hours(max_duration_hours),
            },
            cancellation_window: CancellationWindow(Duration::minutes(cancellation_window_minutes)),
            max_special_instructions,
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────
