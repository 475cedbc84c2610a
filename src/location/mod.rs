//! Location sampling module.
//!
//! Wraps the platform's location stream:
//! - Fix and authorization event types
//! - Provider port (authorization request + event stream)
//! - Sampler holding the latest fix

pub mod models;
pub mod provider;
pub mod sampler;

pub use models::*;
pub use provider::*;
pub use sampler::*;
