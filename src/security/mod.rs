//! Security module.
//!
//! Keeps personal data out of log output.

pub mod pii;

pub use pii::*;
