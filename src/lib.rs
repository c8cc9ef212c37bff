//! # Spotbook booking service
//!
//! Booking lifecycle and availability engine for shared parking spots.
//!
//! ## Architecture
//!
//! The project follows Clean Architecture principles:
//!
//! - **domain**: Booking model, time windows, pricing, state machine and ports
//! - **application**: Booking service and availability oracle
//! - **infrastructure**: SeaORM persistence and the in-memory store
//! - **interfaces**: REST API with Swagger documentation
//! - **shared**: Clock, pagination, validation helpers, shutdown

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};

pub use infrastructure::{
    init_database, DatabaseConfig, InMemoryRepositoryProvider, SeaOrmRepositoryProvider,
};

pub use interfaces::http::create_api_router;
