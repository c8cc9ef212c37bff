//! Fixtures shared by unit tests across layers.

use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::booking::{pricing, Booking, BookingStatus, NewBooking, TimeWindow, VehicleInfo};
use crate::domain::{OperatingSchedule, SpotDetails, SpotId, UserId};

/// `hour:minute` on Monday 2030-06-03, UTC.
pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 6, 3, hour, minute, 0).unwrap()
}

/// Reference "now" for tests: the day before [`at`].
pub fn day_before() -> DateTime<Utc> {
    at(0, 0) - Duration::days(1)
}

pub fn spot(owner_id: UserId, hourly_rate: Decimal) -> SpotDetails {
    SpotDetails {
        id: Uuid::new_v4(),
        owner_id,
        title: "Driveway on Elm St".to_string(),
        hourly_rate,
        active: true,
        schedule: OperatingSchedule::always(),
    }
}

pub fn booking(spot_id: SpotId, start_hour: u32, end_hour: u32, status: BookingStatus) -> Booking {
    let window = TimeWindow::new(at(start_hour, 0), at(end_hour, 0));
    let rate = Decimal::new(500, 2);
    let mut booking = Booking::pending(
        NewBooking {
            renter_id: Uuid::new_v4(),
            spot_id,
            vehicle_id: Uuid::new_v4(),
            window,
            hourly_rate: rate,
            quote: pricing::compute(&window, rate),
            vehicle_info: VehicleInfo::new("abc123", Some("Honda"), None, None).unwrap(),
            special_instructions: None,
        },
        day_before(),
    );
    booking.status = status;
    booking
}
