//! Structured logging with session context.
//!
//! Provides logging macros and utilities that include session_id and
//! attempt_id in every log message for easy correlation.

pub mod structured;

pub use structured::*;
