//! HTTP REST API interfaces
//!
//! - `middleware`: caller identity from gateway headers
//! - `modules`: bookings, health and metrics handlers
//! - `router`: API router with Swagger documentation

pub mod common;
pub mod middleware;
pub mod modules;
pub mod router;

pub use router::{create_api_router, ApiContext, ApiDoc};
