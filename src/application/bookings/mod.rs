//! Booking use cases

pub mod availability;
pub mod service;

pub use availability::AvailabilityOracle;
pub use service::{
    AvailabilityReport, BookingPolicy, BookingService, BookingView, CreateBooking, StatusUpdate,
    VehicleInfoInput,
};
