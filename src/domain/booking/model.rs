//! Booking domain entity

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::pricing::PriceQuote;
use super::window::TimeWindow;
use crate::domain::error::{DomainError, DomainResult, ValidationReason};
use crate::domain::{BookingId, SpotId, UserId, VehicleId};

/// Maximum stored license plate length, in characters.
pub const MAX_LICENSE_PLATE_LEN: usize = 20;
const MAX_VEHICLE_FIELD_LEN: usize = 50;

/// Booking status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookingStatus {
    /// Requested by the renter, awaiting the host
    Pending,
    /// Accepted by the host; holds the slot
    Confirmed,
    /// Parking in progress; holds the slot
    Active,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 5] = [
        Self::Pending,
        Self::Confirmed,
        Self::Active,
        Self::Completed,
        Self::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether a booking in this status makes its window unavailable.
    pub fn blocks_slot(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Active)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl FromStr for BookingStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(DomainError::validation(
                "status",
                ValidationReason::InvalidStatus,
            )),
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment status, reported by the external payment collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }

    /// Parse a status update. Only settled outcomes may be reported;
    /// `pending` is the initial value and never set from outside.
    pub fn parse_update(s: &str) -> DomainResult<Self> {
        match Self::from_str(s)? {
            Self::Pending => Err(DomainError::validation(
                "payment_status",
                ValidationReason::InvalidPaymentStatus,
            )),
            status => Ok(status),
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "failed" => Ok(Self::Failed),
            "refunded" => Ok(Self::Refunded),
            _ => Err(DomainError::validation(
                "payment_status",
                ValidationReason::InvalidPaymentStatus,
            )),
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of the vehicle taken when the booking is made.
///
/// Copied by value so later edits to the vehicle record do not rewrite
/// booking history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleInfo {
    pub license_plate: String,
    pub make: Option<String>,
    pub model: Option<String>,
    pub color: Option<String>,
}

impl VehicleInfo {
    /// Normalise and validate: plate trimmed, uppercased, 1-20 characters;
    /// blank optional fields become `None`.
    pub fn new(
        license_plate: &str,
        make: Option<&str>,
        model: Option<&str>,
        color: Option<&str>,
    ) -> DomainResult<Self> {
        let plate = license_plate.trim().to_uppercase();
        let plate_len = plate.chars().count();
        if plate_len == 0 || plate_len > MAX_LICENSE_PLATE_LEN {
            return Err(DomainError::validation(
                "vehicle_info.license_plate",
                ValidationReason::InvalidLicensePlate,
            ));
        }

        Ok(Self {
            license_plate: plate,
            make: optional_field("vehicle_info.make", make)?,
            model: optional_field("vehicle_info.model", model)?,
            color: optional_field("vehicle_info.color", color)?,
        })
    }
}

fn optional_field(field: &'static str, value: Option<&str>) -> DomainResult<Option<String>> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    if value.chars().count() > MAX_VEHICLE_FIELD_LEN {
        return Err(DomainError::validation(field, ValidationReason::TooLong));
    }
    Ok(Some(value.to_string()))
}

/// Parking reservation
#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    pub id: BookingId,
    pub renter_id: UserId,
    pub spot_id: SpotId,
    pub vehicle_id: VehicleId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Duration in hours, two decimals
    pub total_hours: Decimal,
    /// Spot's hourly rate when the booking was made
    pub hourly_rate: Decimal,
    /// `round(total_hours * hourly_rate, 2)`, frozen at creation
    pub total_price: Decimal,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub vehicle_info: VehicleInfo,
    pub special_instructions: Option<String>,
    /// Bumped on every write; used to reject stale updates
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything needed to create a booking record.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub renter_id: UserId,
    pub spot_id: SpotId,
    pub vehicle_id: VehicleId,
    pub window: TimeWindow,
    pub hourly_rate: Decimal,
    pub quote: PriceQuote,
    pub vehicle_info: VehicleInfo,
    pub special_instructions: Option<String>,
}

impl Booking {
    /// Build a fresh `pending` booking.
    pub fn pending(new: NewBooking, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            renter_id: new.renter_id,
            spot_id: new.spot_id,
            vehicle_id: new.vehicle_id,
            start_time: new.window.start,
            end_time: new.window.end,
            total_hours: new.quote.total_hours,
            hourly_rate: new.hourly_rate,
            total_price: new.quote.total_price,
            status: BookingStatus::Pending,
            payment_status: PaymentStatus::Pending,
            vehicle_info: new.vehicle_info,
            special_instructions: new.special_instructions,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.start_time, self.end_time)
    }

    pub fn blocks_slot(&self) -> bool {
        self.status.blocks_slot()
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::booking::pricing;
    use chrono::{Duration, TimeZone};

    fn sample_booking() -> Booking {
        let start = Utc.with_ymd_and_hms(2030, 6, 3, 10, 0, 0).unwrap();
        let window = TimeWindow::new(start, start + Duration::hours(2));
        let rate = Decimal::new(500, 2);
        Booking::pending(
            NewBooking {
                renter_id: Uuid::new_v4(),
                spot_id: Uuid::new_v4(),
                vehicle_id: Uuid::new_v4(),
                window,
                hourly_rate: rate,
                quote: pricing::compute(&window, rate),
                vehicle_info: VehicleInfo::new("ab 123", None, None, None).unwrap(),
                special_instructions: None,
            },
            start - Duration::days(1),
        )
    }

    #[test]
    fn new_booking_is_pending_and_unpaid() {
        let b = sample_booking();
        assert_eq!(b.status, BookingStatus::Pending);
        assert_eq!(b.payment_status, PaymentStatus::Pending);
        assert_eq!(b.version, 1);
        assert!(!b.blocks_slot());
        assert_eq!(b.total_price, Decimal::new(1000, 2));
    }

    #[test]
    fn only_confirmed_and_active_block() {
        let blocking: Vec<_> = BookingStatus::ALL
            .into_iter()
            .filter(BookingStatus::blocks_slot)
            .collect();
        assert_eq!(blocking, vec![BookingStatus::Confirmed, BookingStatus::Active]);
    }

    #[test]
    fn status_parse_is_case_insensitive() {
        assert_eq!("Confirmed".parse::<BookingStatus>().unwrap(), BookingStatus::Confirmed);
        assert!("paid".parse::<BookingStatus>().is_err());
    }

    #[test]
    fn payment_update_rejects_pending() {
        assert_eq!(PaymentStatus::parse_update("PAID").unwrap(), PaymentStatus::Paid);
        assert_eq!(PaymentStatus::parse_update("refunded").unwrap(), PaymentStatus::Refunded);
        assert!(matches!(
            PaymentStatus::parse_update("pending"),
            Err(DomainError::Validation {
                reason: ValidationReason::InvalidPaymentStatus,
                ..
            })
        ));
        assert!(PaymentStatus::parse_update("chargeback").is_err());
    }

    #[test]
    fn vehicle_info_normalises_plate() {
        let v = VehicleInfo::new("  ab-123 cd ", Some(" Toyota "), Some(""), None).unwrap();
        assert_eq!(v.license_plate, "AB-123 CD");
        assert_eq!(v.make.as_deref(), Some("Toyota"));
        assert_eq!(v.model, None);
    }

    #[test]
    fn vehicle_info_rejects_bad_plates() {
        assert!(VehicleInfo::new("   ", None, None, None).is_err());
        assert!(VehicleInfo::new(&"X".repeat(21), None, None, None).is_err());
        assert!(VehicleInfo::new(&"X".repeat(20), None, None, None).is_ok());
    }

    #[test]
    fn vehicle_info_bounds_optional_fields() {
        let err = VehicleInfo::new("AB1", Some(&"m".repeat(51)), None, None).unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation {
                field: "vehicle_info.make",
                reason: ValidationReason::TooLong
            }
        ));
    }
}
