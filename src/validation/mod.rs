//! Address field validation module.
//!
//! Provides the per-field rules and the form state that gates the
//! "submit enabled" flag:
//! - Field rules (postal code, town, street, house number)
//! - Form state re-evaluated on edit completion

pub mod fields;
pub mod form;

pub use fields::*;
pub use form::*;
