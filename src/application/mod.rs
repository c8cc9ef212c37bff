pub mod bookings;

pub use bookings::{AvailabilityOracle, BookingPolicy, BookingService, BookingView};
