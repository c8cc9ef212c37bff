//! Bookings module: create, read, list, transition, cancel, availability

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
