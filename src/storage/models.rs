//! Local identity records.
//!
//! These models represent the single account record kept on the device.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The local pseudonymous account. At most one exists at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: String,
    pub accepts_open_license: bool,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub updated_at: DateTime<Utc>,
}

/// What the user typed on the registration screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub accepts_open_license: bool,
}

impl Profile {
    /// Profile prefilled from an existing identity.
    ///
    /// An existing identity implies the licence was accepted.
    pub fn from_identity(identity: &Identity) -> Self {
        Self {
            first_name: identity.first_name.clone(),
            last_name: identity.last_name.clone(),
            email: identity.email.clone(),
            accepts_open_license: true,
        }
    }

    /// Record to persist once the service has confirmed the account.
    pub fn into_identity(self, id: &str, updated_at: DateTime<Utc>) -> Identity {
        Identity {
            id: id.to_string(),
            accepts_open_license: self.accepts_open_license,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            updated_at,
        }
    }
}
