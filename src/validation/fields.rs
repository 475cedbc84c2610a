//! Per-field validation rules.
//!
//! Pure functions of the current field text. Length is measured in
//! characters, not bytes, so "Örebro" counts as six.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const POSTAL_CODE_MESSAGE: &str = "wrong digit count in postal code";
pub const POSTAL_TOWN_MESSAGE: &str = "enter a postal town";
pub const STREET_NAME_MESSAGE: &str = "enter a street address";
pub const HOUSE_NUMBER_MESSAGE: &str = "enter a house number";

/// The five editable fields of the address form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldId {
    PostalCode,
    PostalTown,
    StreetName,
    HouseNumber,
    HouseName,
}

impl FieldId {
    pub const ALL: [FieldId; 5] = [
        FieldId::PostalCode,
        FieldId::PostalTown,
        FieldId::StreetName,
        FieldId::HouseNumber,
        FieldId::HouseName,
    ];

    /// Fields that must pass before a report can be submitted.
    pub const REQUIRED: [FieldId; 4] = [
        FieldId::PostalCode,
        FieldId::PostalTown,
        FieldId::StreetName,
        FieldId::HouseNumber,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldId::PostalCode => "postalCode",
            FieldId::PostalTown => "postalTown",
            FieldId::StreetName => "streetName",
            FieldId::HouseNumber => "houseNumber",
            FieldId::HouseName => "houseName",
        }
    }

    pub fn is_required(&self) -> bool {
        !matches!(self, FieldId::HouseName)
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field validation result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValidation {
    pub valid: bool,
    pub message: Option<&'static str>,
}

impl FieldValidation {
    pub fn valid() -> Self {
        Self {
            valid: true,
            message: None,
        }
    }

    pub fn invalid(message: &'static str) -> Self {
        Self {
            valid: false,
            message: Some(message),
        }
    }

    /// Convert into a `Result`, attaching the field for error reporting.
    pub fn into_result(self, field: FieldId) -> Result<(), ValidationError> {
        match self.message {
            Some(message) if !self.valid => Err(ValidationError { field, message }),
            _ => Ok(()),
        }
    }
}

/// Validate one field's raw text.
pub fn validate(field: FieldId, raw: &str) -> FieldValidation {
    let len = raw.chars().count();

    let (ok, message) = match field {
        FieldId::PostalCode => (len == 5, POSTAL_CODE_MESSAGE),
        FieldId::PostalTown => (len > 1, POSTAL_TOWN_MESSAGE),
        FieldId::StreetName => (len > 3, STREET_NAME_MESSAGE),
        FieldId::HouseNumber => (len > 0, HOUSE_NUMBER_MESSAGE),
        FieldId::HouseName => return FieldValidation::valid(),
    };

    if ok {
        FieldValidation::valid()
    } else {
        FieldValidation::invalid(message)
    }
}
