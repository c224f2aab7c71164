//! Product listings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bazaar_core::{Coordinates, Price, ProductId, UserId};

/// A supplier's listing as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListing {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub quantity: u32,
    #[serde(default)]
    pub description: String,
    pub supplier_id: UserId,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Coordinates>,
    /// Free-text pickup address entered by the supplier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// A listing about to be created; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub price: Price,
    pub quantity: u32,
    pub description: String,
    pub supplier_id: UserId,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Coordinates>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl NewProduct {
    /// The stored listing once the store has assigned `id`.
    #[must_use]
    pub fn into_listing(self, id: ProductId) -> ProductListing {
        ProductListing {
            id,
            name: self.name,
            price: self.price,
            quantity: self.quantity,
            description: self.description,
            supplier_id: self.supplier_id,
            created_at: self.created_at,
            location: self.location,
            address: self.address,
        }
    }
}

/// Fields a supplier may edit after listing a product.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub name: String,
    pub price: Price,
    pub quantity: u32,
    pub description: String,
}

impl ProductListing {
    /// Case-insensitive substring match on name or description.
    ///
    /// `needle` must already be lowercased.
    #[must_use]
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
    }

    /// Apply an edit in place.
    pub fn apply(&mut self, update: ProductUpdate) {
        self.name = update.name;
        self.price = update.price;
        self.quantity = update.quantity;
        self.description = update.description;
    }
}
