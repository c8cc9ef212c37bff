//! Domain errors

use std::fmt;

use thiserror::Error;
use uuid::Uuid;

use super::booking::BookingStatus;

/// Machine-readable reason attached to every validation failure.
///
/// Distinct rules share one error kind; the reason code tells the caller which
/// rule the input broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationReason {
    MissingField,
    InvalidTimestamp,
    StartNotInFuture,
    EndNotAfterStart,
    DurationTooShort,
    DurationTooLong,
    OutsideOperatingDays,
    OutsideOperatingHours,
    InvalidSchedule,
    SpotInactive,
    InvalidLicensePlate,
    TooLong,
    InvalidStatus,
    InvalidPaymentStatus,
}

impl ValidationReason {
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::InvalidTimestamp => "invalid_timestamp",
            Self::StartNotInFuture => "start_not_in_future",
            Self::EndNotAfterStart => "end_not_after_start",
            Self::DurationTooShort => "duration_too_short",
            Self::DurationTooLong => "duration_too_long",
            Self::OutsideOperatingDays => "outside_operating_days",
            Self::OutsideOperatingHours => "outside_operating_hours",
            Self::InvalidSchedule => "invalid_schedule",
            Self::SpotInactive => "spot_inactive",
            Self::InvalidLicensePlate => "invalid_license_plate",
            Self::TooLong => "too_long",
            Self::InvalidStatus => "invalid_status",
            Self::InvalidPaymentStatus => "invalid_payment_status",
        }
    }

    fn message(&self) -> &'static str {
        match self {
            Self::MissingField => "value is required",
            Self::InvalidTimestamp => "not a valid RFC 3339 timestamp",
            Self::StartNotInFuture => "start time must be in the future",
            Self::EndNotAfterStart => "end time must be after start time",
            Self::DurationTooShort => "booking is shorter than the minimum duration",
            Self::DurationTooLong => "booking is longer than the maximum duration",
            Self::OutsideOperatingDays => "spot is not open on the requested day",
            Self::OutsideOperatingHours => "requested time is outside the spot's operating hours",
            Self::InvalidSchedule => "operating schedule is malformed",
            Self::SpotInactive => "parking spot is not accepting bookings",
            Self::InvalidLicensePlate => "license plate must be 1-20 characters",
            Self::TooLong => "value exceeds the maximum length",
            Self::InvalidStatus => "unknown booking status",
            Self::InvalidPaymentStatus => "payment status must be one of paid, failed, refunded",
        }
    }
}

impl fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Domain-level error types
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation failed for `{field}`: {reason}")]
    Validation {
        field: &'static str,
        reason: ValidationReason,
    },

    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Hosts cannot book their own parking spot")]
    SelfBookingRejected,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Cannot change booking status from {from} to {to}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    #[error("Bookings can only be cancelled at least {minutes} minutes before they start")]
    CancellationWindowExpired { minutes: i64 },

    #[error("{collaborator} lookup failed: {message}")]
    CollaboratorFailure {
        collaborator: &'static str,
        message: String,
    },

    #[error("Booking {0} was modified concurrently, reload it and retry")]
    ConcurrentModification(Uuid),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn validation(field: &'static str, reason: ValidationReason) -> Self {
        Self::Validation { field, reason }
    }

    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound {
            entity,
            field: "id",
            value: id.to_string(),
        }
    }

    /// Whether the caller may succeed by retrying the same request unchanged.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::ConcurrentModification(_) | Self::CollaboratorFailure { .. }
        )
    }
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
