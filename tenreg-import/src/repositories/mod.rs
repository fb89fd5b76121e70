//! Entity repositories
//!
//! Thin persistence operations over the registry pool. Expected
//! absence is an `Ok(None)`, never an error; constraint violations on
//! create surface as `Err` for the commit engine to contain.

pub mod buildings;
pub mod claims;
pub mod history;
pub mod persons;
pub mod units;
