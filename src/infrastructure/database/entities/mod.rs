//! Database entities module

pub mod booking;
pub mod booking_spot_guard;
pub mod parking_spot;
pub mod vehicle;

pub use booking::Entity as Booking;
pub use booking_spot_guard::Entity as BookingSpotGuard;
pub use parking_spot::Entity as ParkingSpot;
pub use vehicle::Entity as Vehicle;
