pub mod shutdown;
pub mod time;
pub mod types;
pub mod validations;

pub use shutdown::*;
pub use time::*;
pub use types::*;
pub use validations::*;

#[cfg(test)]
pub mod testing;
