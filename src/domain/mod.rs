//! Core booking domain: entities, rules and the ports the engine depends on.

pub mod booking;
pub mod error;
pub mod identity;
pub mod repositories;
pub mod spot;
pub mod vehicle;

use uuid::Uuid;

pub type BookingId = Uuid;
pub type UserId = Uuid;
pub type SpotId = Uuid;
pub type VehicleId = Uuid;

pub use booking::{Booking, BookingRepository, BookingStatus, PaymentStatus, VehicleInfo};
pub use error::{DomainError, DomainResult, ValidationReason};
pub use identity::{Caller, UserRole};
pub use repositories::RepositoryProvider;
pub use spot::{LookupError, OperatingSchedule, SpotDetails, SpotLookup};
pub use vehicle::VehicleLookup;
