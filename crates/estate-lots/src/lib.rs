pub mod config;
pub mod error;
pub mod exchange;
pub mod inventory;
pub mod telemetry;
