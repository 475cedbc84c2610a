//! Postnummeruppror Core - report-capture workflow
//!
//! This crate holds the stateful part of the postnummeruppror collection
//! app: a user reports which postal code belongs to an address, together
//! with a GPS fix, after registering a pseudonymous account once.
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `validation` - Per-field rules and the "submit enabled" form state
//! - `location` - Latest-fix sampling over a provider event stream
//! - `storage` - The single local identity record and its stores
//! - `pipeline` - Payload construction, HTTP transport, submit/register
//! - `routing` - Response interpretation into outcomes
//! - `screen` - Report and registration controllers, presenter port
//! - `security` - Keeps personal data out of logs
//! - `logging` - Structured logging with session context
//! - `config` - Service endpoints and timeouts

pub mod config;
pub mod error;
pub mod location;
pub mod logging;
pub mod pipeline;
pub mod routing;
pub mod screen;
pub mod security;
pub mod storage;
pub mod validation;

pub use config::ServiceConfig;
pub use error::{ConfigError, PersistenceError, TransportError, ValidationError};

/// Initialize the process-wide logger.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_logger() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format_timestamp_millis()
        .try_init();
}
