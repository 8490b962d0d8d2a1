//! # EV Swap Service
//!
//! Backend of a battery-swap station network: stations with cabinets and
//! slots, battery stock, driver bookings, swap execution, memberships,
//! payments through PayOS and battery transfers between stations.
//!
//! ## Architecture
//!
//! - **domain**: models, status rules and events. No I/O.
//! - **application**: transactional workflows, event bus, sweeps
//! - **infrastructure**: SeaORM persistence, crypto, payment gateway
//! - **interfaces**: REST API with Swagger, notification WebSocket
//! - **server**: process lifecycle shared by the CLI

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};

// Re-export database types for easy access
pub use infrastructure::{init_database, DatabaseConfig};

pub use application::{create_event_bus, AppServices, EventBus, SharedEventBus};
pub use interfaces::http::{create_api_router, ApiState};
