//! Saved delivery/pickup addresses.

use serde::{Deserialize, Serialize};

use bazaar_core::AddressId;

/// The editable part of a saved address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressDetails {
    pub full_name: String,
    pub mobile: String,
    pub pincode: String,
    pub flat: String,
    pub street: String,
    #[serde(default)]
    pub landmark: String,
    pub city: String,
    pub state: String,
}

/// A saved address in a user's address book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: AddressId,
    #[serde(flatten)]
    pub details: AddressDetails,
}

impl AddressDetails {
    /// Single-line rendering used in address pickers.
    #[must_use]
    pub fn one_line(&self) -> String {
        let mut parts: Vec<&str> = [self.flat.as_str(), self.street.as_str(), self.landmark.as_str()]
            .into_iter()
            .filter(|p| !p.trim().is_empty())
            .collect();
        let tail = format!("{}, {} - {}", self.city, self.state, self.pincode);
        parts.push(&tail);
        parts.join(", ")
    }
}
