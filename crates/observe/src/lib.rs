//! Logging setup shared by the exchange binary and its tests.
pub mod config;
pub mod tracing;

pub use config::{Config, Format};
