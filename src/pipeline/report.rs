//! Report payload construction.
//!
//! Pure and deterministic: the same form, fix and identity always produce
//! the same payload. A missing fix becomes a zero coordinate, never an
//! omitted one.

use serde::Serialize;

use crate::config::ServiceConfig;
use crate::error::ValidationError;
use crate::location::LocationFix;
use crate::storage::Identity;
use crate::validation::{validate, AddressForm, FieldId, PostalAddress};

pub const GPS_PROVIDER: &str = "gps";

/// Coordinate as sent to the collection service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coordinate {
    pub provider: &'static str,
    pub accuracy: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

impl Coordinate {
    /// Placeholder used before the first fix arrives.
    pub fn zero() -> Self {
        Self {
            provider: GPS_PROVIDER,
            accuracy: 0.0,
            latitude: 0.0,
            longitude: 0.0,
            altitude: 0.0,
        }
    }
}

impl From<&LocationFix> for Coordinate {
    fn from(fix: &LocationFix) -> Self {
        Self {
            provider: GPS_PROVIDER,
            accuracy: fix.horizontal_accuracy_meters,
            latitude: fix.latitude,
            longitude: fix.longitude,
            altitude: fix.altitude_meters,
        }
    }
}

/// Immutable snapshot sent for one submit action.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPayload {
    application_version: String,
    application: String,
    account_identity: String,
    coordinate: Coordinate,
    postal_address: PostalAddress,
}

impl ReportPayload {
    pub fn application_version(&self) -> &str {
        &self.application_version
    }

    pub fn application(&self) -> &str {
        &self.application
    }

    pub fn account_identity(&self) -> &str {
        &self.account_identity
    }

    pub fn coordinate(&self) -> &Coordinate {
        &self.coordinate
    }

    pub fn postal_address(&self) -> &PostalAddress {
        &self.postal_address
    }
}

/// Builds payloads for one application id and version.
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    application: String,
    application_version: String,
}

impl ReportBuilder {
    pub fn new(application: &str, application_version: &str) -> Self {
        Self {
            application: application.to_string(),
            application_version: application_version.to_string(),
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(&config.application, &config.application_version)
    }

    pub fn build(
        &self,
        address: &PostalAddress,
        fix: Option<&LocationFix>,
        identity: &Identity,
    ) -> ReportPayload {
        ReportPayload {
            application_version: self.application_version.clone(),
            application: self.application.clone(),
            account_identity: identity.id.clone(),
            coordinate: fix.map(Coordinate::from).unwrap_or_else(Coordinate::zero),
            postal_address: address.clone(),
        }
    }

    /// Build from the form, failing on the first required field that
    /// does not validate.
    pub fn build_validated(
        &self,
        form: &AddressForm,
        fix: Option<&LocationFix>,
        identity: &Identity,
    ) -> Result<ReportPayload, ValidationError> {
        let address = form.snapshot();
        for field in FieldId::REQUIRED {
            validate(field, address.field(field)).into_result(field)?;
        }
        Ok(self.build(&address, fix, identity))
    }
}
