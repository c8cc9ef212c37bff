//! Booking aggregate
//!
//! Contains the Booking entity, the window/price/availability rules,
//! the status state machine and the repository interface.

pub mod availability;
pub mod model;
pub mod pricing;
pub mod repository;
pub mod state_machine;
pub mod window;

pub use model::{Booking, BookingStatus, NewBooking, PaymentStatus, VehicleInfo};
pub use pricing::PriceQuote;
pub use repository::{BookingRepository, StatusChange};
pub use state_machine::{CancellationWindow, Party};
pub use window::{TimeWindow, WindowRules};
