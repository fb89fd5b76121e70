//! Shared foundation for the tenreg services
//!
//! Provides the common error type, configuration resolution, database
//! initialization, and the entity models persisted by the registry.

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
