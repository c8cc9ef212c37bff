//! Booking DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::application::bookings::{AvailabilityReport, BookingView, VehicleInfoInput};
use crate::domain::booking::{Booking, TimeWindow, VehicleInfo};
use crate::domain::SpotDetails;

/// Vehicle snapshot submitted with a booking
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct VehicleInfoDto {
    /// Stored uppercased
    #[validate(length(min = 1, max = 20))]
    pub license_plate: String,
    #[validate(length(max = 50))]
    pub make: Option<String>,
    #[validate(length(max = 50))]
    pub model: Option<String>,
    #[validate(length(max = 50))]
    pub color: Option<String>,
}

impl From<VehicleInfoDto> for VehicleInfoInput {
    fn from(v: VehicleInfoDto) -> Self {
        Self {
            license_plate: v.license_plate,
            make: v.make,
            model: v.model,
            color: v.color,
        }
    }
}

impl From<VehicleInfo> for VehicleInfoDto {
    fn from(v: VehicleInfo) -> Self {
        Self {
            license_plate: v.license_plate,
            make: v.make,
            model: v.model,
            color: v.color,
        }
    }
}

/// Request to book a spot
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBookingRequest {
    pub spot_id: Uuid,
    pub vehicle_id: Uuid,
    /// RFC 3339 start instant, e.g. `2030-06-03T10:00:00Z`
    #[validate(length(min = 1, code = "missing_field"))]
    pub start_time: String,
    /// RFC 3339 end instant (exclusive)
    #[validate(length(min = 1, code = "missing_field"))]
    pub end_time: String,
    #[validate(nested)]
    pub vehicle_info: VehicleInfoDto,
    pub special_instructions: Option<String>,
}

/// Status and/or payment-status change. Both fields optional.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBookingStatusRequest {
    /// pending, confirmed, active, completed, cancelled
    pub status: Option<String>,
    /// paid, failed, refunded
    pub payment_status: Option<String>,
}

/// Filters for booking lists
#[derive(Debug, Deserialize, IntoParams)]
pub struct BookingListQuery {
    /// Only bookings in this status
    pub status: Option<String>,
    /// Page number, from 1 (default 1)
    pub page: Option<u64>,
    /// Page size, 1-100 (default 10)
    pub limit: Option<u64>,
}

/// Window to check
#[derive(Debug, Deserialize, IntoParams)]
pub struct AvailabilityQuery {
    /// RFC 3339 start instant
    pub start: String,
    /// RFC 3339 end instant
    pub end: String,
}

/// Booking in API responses
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookingDto {
    pub id: Uuid,
    pub renter_id: Uuid,
    pub spot_id: Uuid,
    pub vehicle_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub total_hours: Decimal,
    /// Spot rate when the booking was made
    pub hourly_rate: Decimal,
    pub total_price: Decimal,
    pub status: String,
    pub payment_status: String,
    pub vehicle_info: VehicleInfoDto,
    pub special_instructions: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Booking> for BookingDto {
    fn from(b: Booking) -> Self {
        Self {
            id: b.id,
            renter_id: b.renter_id,
            spot_id: b.spot_id,
            vehicle_id: b.vehicle_id,
            start_time: b.start_time,
            end_time: b.end_time,
            total_hours: b.total_hours,
            hourly_rate: b.hourly_rate,
            total_price: b.total_price,
            status: b.status.to_string(),
            payment_status: b.payment_status.to_string(),
            vehicle_info: b.vehicle_info.into(),
            special_instructions: b.special_instructions,
            created_at: b.created_at,
            updated_at: b.updated_at,
        }
    }
}

/// Spot fields shown next to a booking
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SpotSummaryDto {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    /// Current rate; may differ from the booking's frozen rate
    pub hourly_rate: Decimal,
}

impl From<SpotDetails> for SpotSummaryDto {
    fn from(s: SpotDetails) -> Self {
        Self {
            id: s.id,
            owner_id: s.owner_id,
            title: s.title,
            hourly_rate: s.hourly_rate,
        }
    }
}

/// Booking with its spot resolved; `spot` is null if the spot was removed
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookingDetailsDto {
    pub booking: BookingDto,
    pub spot: Option<SpotSummaryDto>,
}

impl From<BookingView> for BookingDetailsDto {
    fn from(v: BookingView) -> Self {
        Self {
            booking: v.booking.into(),
            spot: v.spot.map(Into::into),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TimeWindowDto {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl From<TimeWindow> for TimeWindowDto {
    fn from(w: TimeWindow) -> Self {
        Self {
            start_time: w.start,
            end_time: w.end,
        }
    }
}

/// Availability of a spot for a window
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AvailabilityDto {
    pub spot_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub available: bool,
    /// Confirmed or active bookings in the way
    pub conflicts: Vec<TimeWindowDto>,
}

impl From<AvailabilityReport> for AvailabilityDto {
    fn from(r: AvailabilityReport) -> Self {
        Self {
            spot_id: r.spot_id,
            start_time: r.window.start,
            end_time: r.window.end,
            available: r.available,
            conflicts: r.conflicts.into_iter().map(Into::into).collect(),
        }
    }
}
