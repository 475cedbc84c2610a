//! Address form state.
//!
//! Holds the five text fields and their last evaluated validation.
//! Validation runs when a field's edit completes, not on every keystroke.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::fields::{validate, FieldId, FieldValidation};

/// Postal address as entered by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostalAddress {
    pub postal_code: String,
    pub postal_town: String,
    pub street_name: String,
    pub house_number: String,
    pub house_name: String,
}

impl PostalAddress {
    pub fn field(&self, field: FieldId) -> &str {
        match field {
            FieldId::PostalCode => &self.postal_code,
            FieldId::PostalTown => &self.postal_town,
            FieldId::StreetName => &self.street_name,
            FieldId::HouseNumber => &self.house_number,
            FieldId::HouseName => &self.house_name,
        }
    }

    fn field_mut(&mut self, field: FieldId) -> &mut String {
        match field {
            FieldId::PostalCode => &mut self.postal_code,
            FieldId::PostalTown => &mut self.postal_town,
            FieldId::StreetName => &mut self.street_name,
            FieldId::HouseNumber => &mut self.house_number,
            FieldId::HouseName => &mut self.house_name,
        }
    }
}

/// True iff every required field passes; houseName never matters.
pub fn is_ready_to_submit(address: &PostalAddress) -> bool {
    FieldId::REQUIRED
        .iter()
        .all(|field| validate(*field, address.field(*field)).valid)
}

/// Editable form with per-field validation state.
#[derive(Debug, Clone)]
pub struct AddressForm {
    address: PostalAddress,
    validations: HashMap<FieldId, FieldValidation>,
}

impl Default for AddressForm {
    fn default() -> Self {
        Self::from_address(PostalAddress::default())
    }
}

impl AddressForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Form with every field already evaluated.
    pub fn from_address(address: PostalAddress) -> Self {
        let validations = FieldId::ALL
            .iter()
            .map(|field| (*field, validate(*field, address.field(*field))))
            .collect();
        Self {
            address,
            validations,
        }
    }

    /// Keystroke-level update. Does not re-run validation.
    pub fn set_text(&mut self, field: FieldId, text: &str) {
        *self.address.field_mut(field) = text.to_string();
    }

    /// Edit-completion event: re-validate the field and return the result.
    pub fn complete_edit(&mut self, field: FieldId) -> FieldValidation {
        let result = validate(field, self.address.field(field));
        log::debug!(
            "FIELD_VALIDATED field={} valid={} message={:?}",
            field,
            result.valid,
            result.message
        );
        self.validations.insert(field, result.clone());
        result
    }

    /// Convenience for `set_text` followed by `complete_edit`.
    pub fn edit(&mut self, field: FieldId, text: &str) -> FieldValidation {
        self.set_text(field, text);
        self.complete_edit(field)
    }

    pub fn text(&self, field: FieldId) -> &str {
        self.address.field(field)
    }

    pub fn validation(&self, field: FieldId) -> FieldValidation {
        self.validations
            .get(&field)
            .cloned()
            .unwrap_or_else(FieldValidation::valid)
    }

    /// Drives the "submit enabled" flag.
    pub fn is_ready_to_submit(&self) -> bool {
        FieldId::REQUIRED
            .iter()
            .all(|field| self.validation(*field).valid)
    }

    /// Messages for every failing field, in form order.
    pub fn messages(&self) -> Vec<(FieldId, &'static str)> {
        FieldId::ALL
            .iter()
            .filter_map(|field| self.validation(*field).message.map(|m| (*field, m)))
            .collect()
    }

    /// Copy of the current field text.
    pub fn snapshot(&self) -> PostalAddress {
        self.address.clone()
    }
}
