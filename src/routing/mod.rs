//! Outcome routing module.
//!
//! Decides what a network exchange meant:
//! - Success (report id, or account confirmed)
//! - Server rejection
//! - Network error
//! - Malformed response

pub mod outcome;
pub mod response;

pub use outcome::*;
pub use response::*;
