//! Storage module.
//!
//! The local identity record and the stores that keep it.
//! Note: the on-device database is owned by the platform; this module
//! defines the narrow port the core needs plus two plain implementations.

pub mod identity_store;
pub mod models;

pub use identity_store::*;
pub use models::*;
