//! Report pipeline module.
//!
//! Coordinates the network side of the report-capture workflow:
//! - Payload construction
//! - HTTP transport
//! - Report submission
//! - Account registration

pub mod context;
pub mod registration;
pub mod report;
pub mod submission;
pub mod transport;

pub use context::*;
pub use registration::*;
pub use report::*;
pub use submission::*;
pub use transport::*;
