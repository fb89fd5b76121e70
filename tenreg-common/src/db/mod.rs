//! Database access shared across tenreg services

pub mod init;
pub mod models;

pub use init::init_database;
