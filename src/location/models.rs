//! Location data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixes less accurate than this are flagged to the user.
pub const POOR_ACCURACY_THRESHOLD_M: f64 = 50.0;

/// One GPS reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationFix {
    pub latitude: f64,
    pub longitude: f64,
    pub horizontal_accuracy_meters: f64,
    pub altitude_meters: f64,
    pub captured_at: DateTime<Utc>,
}

impl LocationFix {
    /// Fix captured now.
    pub fn new(latitude: f64, longitude: f64, accuracy: f64, altitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            horizontal_accuracy_meters: accuracy,
            altitude_meters: altitude,
            captured_at: Utc::now(),
        }
    }

    pub fn quality(&self) -> FixQuality {
        if self.horizontal_accuracy_meters > POOR_ACCURACY_THRESHOLD_M {
            FixQuality::Poor
        } else {
            FixQuality::Good
        }
    }
}

/// Advisory accuracy classification. Never blocks a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixQuality {
    Missing,
    Good,
    Poor,
}

/// Platform location authorization state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthorizationStatus {
    #[default]
    NotDetermined,
    Granted,
    Denied,
    Restricted,
}

impl AuthorizationStatus {
    pub fn is_denied(&self) -> bool {
        matches!(self, AuthorizationStatus::Denied | AuthorizationStatus::Restricted)
    }
}

/// Events pushed by a location provider.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationEvent {
    FixReceived(LocationFix),
    AuthorizationChanged(AuthorizationStatus),
}

/// Notices the sampler raises for the UI collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum SamplerNotice {
    /// Location access refused; the UI should explain how to re-enable it.
    AuthorizationDenied,
    /// A new fix arrived; carries its advisory accuracy.
    FixUpdated {
        accuracy_meters: f64,
        quality: FixQuality,
    },
}

/// Map viewport handed to the map collaborator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapRegion {
    pub center_latitude: f64,
    pub center_longitude: f64,
    pub radius_meters: f64,
}

/// Radius used when centring on a fix.
pub const REGION_RADIUS_M: f64 = 250.0;

/// Somewhere in central Sweden, shown before the first fix.
pub const DEFAULT_REGION: MapRegion = MapRegion {
    center_latitude: 59.635039,
    center_longitude: 14.841073,
    radius_meters: REGION_RADIUS_M,
};

impl MapRegion {
    pub fn around(fix: &LocationFix) -> Self {
        Self {
            center_latitude: fix.latitude,
            center_longitude: fix.longitude,
            radius_meters: REGION_RADIUS_M,
        }
    }
}
