//! In-process storage

mod memory;

pub use memory::{InMemoryBookingRepository, InMemoryDirectory, InMemoryRepositoryProvider};
