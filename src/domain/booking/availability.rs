//! Slot-blocking predicate shared by every booking store.

use super::model::Booking;
use super::window::TimeWindow;
use crate::domain::BookingId;

/// Does `booking` make `window` unavailable?
///
/// Only confirmed and active bookings block; `exclude` skips the booking
/// being re-checked during its own status change.
pub fn blocks(booking: &Booking, window: &TimeWindow, exclude: Option<BookingId>) -> bool {
    booking.blocks_slot() && Some(booking.id) != exclude && booking.window().overlaps(window)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::booking::model::{BookingStatus, NewBooking, VehicleInfo};
    use crate::domain::booking::pricing;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 6, 3, hour, 0, 0).unwrap()
    }

    fn booking(start: u32, end: u32, status: BookingStatus) -> Booking {
        let window = TimeWindow::new(at(start), at(end));
        let mut b = Booking::pending(
            NewBooking {
                renter_id: Uuid::new_v4(),
                spot_id: Uuid::new_v4(),
                vehicle_id: Uuid::new_v4(),
                window,
                hourly_rate: Decimal::ONE,
                quote: pricing::compute(&window, Decimal::ONE),
                vehicle_info: VehicleInfo::new("AB1", None, None, None).unwrap(),
                special_instructions: None,
            },
            at(0) - Duration::days(1),
        );
        b.status = status;
        b
    }

    #[test]
    fn confirmed_overlap_blocks() {
        let existing = booking(10, 12, BookingStatus::Confirmed);
        assert!(blocks(&existing, &TimeWindow::new(at(11), at(13)), None));
    }

    #[test]
    fn pending_and_cancelled_never_block() {
        let w = TimeWindow::new(at(10), at(12));
        for status in [BookingStatus::Pending, BookingStatus::Cancelled, BookingStatus::Completed] {
            assert!(!blocks(&booking(10, 12, status), &w, None), "{status} must not block");
        }
    }

    #[test]
    fn adjacent_windows_do_not_block() {
        let existing = booking(10, 12, BookingStatus::Active);
        assert!(!blocks(&existing, &TimeWindow::new(at(12), at(14)), None));
        assert!(!blocks(&existing, &TimeWindow::new(at(8), at(10)), None));
    }

    #[test]
    fn excluded_booking_is_ignored() {
        let existing = booking(10, 12, BookingStatus::Confirmed);
        let w = existing.window();
        assert!(!blocks(&existing, &w, Some(existing.id)));
    }
}
