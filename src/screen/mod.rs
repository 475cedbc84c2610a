//! Screen controllers.
//!
//! Sequencing for the two screens of the app:
//! - Report screen (identity gate, form, location, submission)
//! - Registration screen (profile, licence, account registration)
//!
//! Rendering, focus handling and dialog styling belong to the platform,
//! reached through the [`Presenter`] port.

pub mod messages;
pub mod presenter;
pub mod registration;
pub mod report;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use messages::*;
pub use presenter::*;
pub use registration::*;
pub use report::*;
