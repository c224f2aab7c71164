//! Vendor reviews.

use std::collections::HashMap;

use chrono::Utc;
use thiserror::Error;
use tracing::{info, instrument};

use bazaar_core::ProductId;

use crate::db::{RepositoryError, ReviewRepository};
use crate::models::{NewReview, Review};
use crate::store::DocumentStore;
use crate::validation::ValidationError;

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Unsent review text, one draft per product.
#[derive(Debug, Clone, Default)]
pub struct ReviewDrafts {
    drafts: HashMap<ProductId, String>,
}

impl ReviewDrafts {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, product_id: ProductId, text: impl Into<String>) {
        self.drafts.insert(product_id, text.into());
    }

    #[must_use]
    pub fn get(&self, product_id: &ProductId) -> &str {
        self.drafts.get(product_id).map_or("", String::as_str)
    }

    pub fn clear(&mut self, product_id: &ProductId) {
        self.drafts.remove(product_id);
    }
}

pub struct ReviewService<'a, S> {
    store: &'a S,
}

impl<'a, S: DocumentStore> ReviewService<'a, S> {
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Post a review for a product.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyReview` for blank text and
    /// `ReviewError::Repository` if the write fails.
    #[instrument(skip(self, text), fields(product_id = %product_id))]
    pub async fn submit(&self, product_id: &ProductId, text: &str) -> Result<Review, ReviewError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyReview.into());
        }

        let review = ReviewRepository::new(self.store)
            .create(NewReview {
                product_id: product_id.clone(),
                text: text.to_owned(),
                created_at: Utc::now(),
            })
            .await?;
        info!(review_id = %review.id, "Review posted");
        Ok(review)
    }

    /// Post the draft for a product, clearing it on success.
    ///
    /// # Errors
    ///
    /// Same as [`ReviewService::submit`]; the draft is kept on failure.
    pub async fn submit_draft(
        &self,
        drafts: &mut ReviewDrafts,
        product_id: &ProductId,
    ) -> Result<Review, ReviewError> {
        let review = self.submit(product_id, drafts.get(product_id)).await?;
        drafts.clear(product_id);
        Ok(review)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::{CollectionPath, MemoryStore};

    #[tokio::test]
    async fn test_submit_trims_text() {
        let store = MemoryStore::new();
        let review = ReviewService::new(&store)
            .submit(&ProductId::new("p1"), "  Very fresh  ")
            .await
            .unwrap();
        assert_eq!(review.text, "Very fresh");

        let stored = ReviewRepository::new(&store)
            .list_for(&ProductId::new("p1"))
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, review.id);
        assert_eq!(stored[0].text, "Very fresh");
    }

    #[tokio::test]
    async fn test_blank_review_is_rejected() {
        let store = MemoryStore::new();
        let err = ReviewService::new(&store)
            .submit(&ProductId::new("p1"), "   ")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Please enter a review.");
        assert_eq!(store.count(&CollectionPath::reviews()), 0);
    }

    #[tokio::test]
    async fn test_draft_cleared_only_on_success() {
        let store = MemoryStore::new();
        let service = ReviewService::new(&store);
        let p1 = ProductId::new("p1");
        let mut drafts = ReviewDrafts::new();

        drafts.set(p1.clone(), " ");
        assert!(service.submit_draft(&mut drafts, &p1).await.is_err());
        assert_eq!(drafts.get(&p1), " ");

        drafts.set(p1.clone(), "Good onions");
        service.submit_draft(&mut drafts, &p1).await.unwrap();
        assert_eq!(drafts.get(&p1), "");
    }

    #[test]
    fn test_drafts_are_per_product() {
        let mut drafts = ReviewDrafts::new();
        drafts.set(ProductId::new("p1"), "one");
        drafts.set(ProductId::new("p2"), "two");
        drafts.clear(&ProductId::new("p1"));
        assert_eq!(drafts.get(&ProductId::new("p1")), "");
        assert_eq!(drafts.get(&ProductId::new("p2")), "two");
    }
}
