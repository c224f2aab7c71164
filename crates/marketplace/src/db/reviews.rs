//! Review repository.

use bazaar_core::{ProductId, ReviewId};

use super::{RepositoryError, decode_all, encode};
use crate::models::{NewReview, Review};
use crate::store::{CollectionPath, Direction, DocumentStore, Query, Subscription};

fn reviews_for(product_id: &ProductId) -> Query {
    Query::collection(CollectionPath::reviews())
        .where_eq("productId", product_id.as_str())
        .order_by("createdAt", Direction::Descending)
}

/// Repository for the `reviews` collection.
pub struct ReviewRepository<'a, S> {
    store: &'a S,
}

impl<'a, S: DocumentStore> ReviewRepository<'a, S> {
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Append a review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the write is rejected.
    pub async fn create(&self, review: NewReview) -> Result<Review, RepositoryError> {
        let fields = encode(&review)?;
        let id = self.store.create(&CollectionPath::reviews(), fields).await?;
        Ok(Review {
            id: ReviewId::new(id),
            product_id: review.product_id,
            text: review.text,
            created_at: review.created_at,
        })
    }

    /// Reviews of one product, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the query fails.
    pub async fn list_for(&self, product_id: &ProductId) -> Result<Vec<Review>, RepositoryError> {
        let docs = self.store.query(&reviews_for(product_id)).await?;
        Ok(decode_all(docs))
    }

    /// Live reviews of one product, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the subscription is rejected.
    pub async fn subscribe_for(
        &self,
        product_id: &ProductId,
    ) -> Result<Subscription<Vec<Review>>, RepositoryError> {
        let sub = self.store.subscribe(&reviews_for(product_id)).await?;
        Ok(sub.map(decode_all))
    }
}
