//! Product listing repository.

use bazaar_core::{ProductId, UserId};
use tracing::instrument;

use super::{RepositoryError, decode, decode_all, encode};
use crate::models::{NewProduct, ProductListing, ProductUpdate};
use crate::store::{CollectionPath, Direction, DocumentStore, Query, StoreError, Subscription};

/// Which listings a product query covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductScope {
    /// The whole marketplace (vendor view).
    All,
    /// One supplier's listings (supplier dashboard).
    Supplier(UserId),
}

impl ProductScope {
    /// Store query for this scope, newest first.
    #[must_use]
    pub fn query(&self) -> Query {
        let query = Query::collection(CollectionPath::products());
        let query = match self {
            Self::All => query,
            Self::Supplier(uid) => query.where_eq("supplierId", uid.as_str()),
        };
        query.order_by("createdAt", Direction::Descending)
    }
}

/// Repository for the `products` collection.
pub struct ProductRepository<'a, S> {
    store: &'a S,
}

impl<'a, S: DocumentStore> ProductRepository<'a, S> {
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Create a listing, returning it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the write is rejected.
    #[instrument(skip(self, product), fields(supplier_id = %product.supplier_id))]
    pub async fn create(&self, product: NewProduct) -> Result<ProductListing, RepositoryError> {
        let fields = encode(&product)?;
        let id = self
            .store
            .create(&CollectionPath::products(), fields)
            .await?;
        Ok(product.into_listing(ProductId::new(id)))
    }

    /// Get a listing by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the read fails.
    /// Returns `RepositoryError::DataCorruption` if the stored listing is invalid.
    pub async fn get(&self, id: &ProductId) -> Result<Option<ProductListing>, RepositoryError> {
        self.store
            .get(&CollectionPath::products(), id.as_str())
            .await?
            .map(decode)
            .transpose()
    }

    /// Overwrite the editable fields of a listing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the listing does not exist.
    /// Returns `RepositoryError::Store` for other store failures.
    pub async fn update(&self, id: &ProductId, update: &ProductUpdate) -> Result<(), RepositoryError> {
        let fields = encode(update)?;
        self.store
            .update(&CollectionPath::products(), id.as_str(), fields)
            .await
            .map_err(|e| match e {
                StoreError::NotFound { .. } => RepositoryError::NotFound,
                other => RepositoryError::Store(other),
            })
    }

    /// Delete a listing. Its reviews are left in place.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the delete is rejected.
    pub async fn delete(&self, id: &ProductId) -> Result<(), RepositoryError> {
        self.store
            .delete(&CollectionPath::products(), id.as_str())
            .await?;
        Ok(())
    }

    /// One-shot listing for a scope, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the query fails.
    pub async fn list(&self, scope: &ProductScope) -> Result<Vec<ProductListing>, RepositoryError> {
        let docs = self.store.query(&scope.query()).await?;
        Ok(decode_all(docs))
    }

    /// Live listing for a scope, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the subscription is rejected.
    pub async fn subscribe(
        &self,
        scope: &ProductScope,
    ) -> Result<Subscription<Vec<ProductListing>>, RepositoryError> {
        let sub = self.store.subscribe(&scope.query()).await?;
        Ok(sub.map(decode_all))
    }
}
