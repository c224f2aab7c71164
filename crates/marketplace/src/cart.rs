//! Vendor shopping cart.
//!
//! Held by the consumer, never persisted. The same listing may be added any
//! number of times; removing by id removes every entry with that id.

use bazaar_core::{Price, PriceError, ProductId};

use crate::models::ProductListing;

/// Ordered sequence of selected listings.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    items: Vec<ProductListing>,
}

impl Cart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a listing. Duplicates are kept as separate entries.
    pub fn add(&mut self, product: ProductListing) {
        self.items.push(product);
    }

    /// Remove every entry for `product_id`, returning how many were removed.
    pub fn remove(&mut self, product_id: &ProductId) -> usize {
        let before = self.items.len();
        self.items.retain(|item| &item.id != product_id);
        before - self.items.len()
    }

    #[must_use]
    pub fn items(&self) -> &[ProductListing] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.items.iter().any(|item| &item.id == product_id)
    }

    /// Sum of the prices of all entries, duplicates included.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Overflow` if the total is out of range.
    pub fn total(&self) -> Result<Price, PriceError> {
        Price::sum(self.items.iter().map(|item| &item.price))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
