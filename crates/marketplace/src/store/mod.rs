//! Document store collaborator.
//!
//! # Collections
//!
//! - `users` - one [`UserRecord`](crate::models::UserRecord) per auth uid
//! - `products` - supplier listings
//! - `reviews` - vendor reviews, referencing a product by id
//! - `users/{uid}/addresses` - saved addresses (at most 3, checked by the app)
//!
//! Documents are untyped JSON field maps at this layer. The typed
//! repositories in [`crate::db`] are the only code that translates between
//! documents and models.

mod memory;
mod query;
mod subscription;

use std::fmt;
use std::future::Future;

use bazaar_core::UserId;
use thiserror::Error;

pub use memory::MemoryStore;
pub use query::{Direction, Filter, OrderBy, Query};
pub use subscription::{Subscription, SubscriptionHandle, SubscriptionId};

/// Field map of a stored document.
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// A document as returned by the store: its id plus its fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

/// Path of a (possibly nested) collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionPath(String);

impl CollectionPath {
    #[must_use]
    pub fn users() -> Self {
        Self("users".to_owned())
    }

    #[must_use]
    pub fn products() -> Self {
        Self("products".to_owned())
    }

    #[must_use]
    pub fn reviews() -> Self {
        Self("reviews".to_owned())
    }

    /// The per-user `addresses` sub-collection.
    #[must_use]
    pub fn addresses(uid: &UserId) -> Self {
        Self(format!("users/{uid}/addresses"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors reported by the document store.
///
/// Messages are shown to the user as-is.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The document does not exist.
    #[error("No document to update: {collection}/{id}")]
    NotFound { collection: String, id: String },

    /// Security rules rejected the operation.
    #[error("Missing or insufficient permissions.")]
    PermissionDenied,

    /// The backend could not be reached.
    #[error("The service is currently unavailable: {0}")]
    Unavailable(String),

    /// The payload could not be stored.
    #[error("Invalid document data: {0}")]
    InvalidData(String),
}

/// Hosted document database with live queries.
///
/// Every method is a single round trip; no method retries on failure.
pub trait DocumentStore: Send + Sync {
    /// Add a document with a store-assigned id, returning the id.
    fn create(
        &self,
        collection: &CollectionPath,
        fields: Fields,
    ) -> impl Future<Output = Result<String, StoreError>> + Send;

    /// Create or replace the document at a known id.
    fn set(
        &self,
        collection: &CollectionPath,
        id: &str,
        fields: Fields,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Read a single document.
    fn get(
        &self,
        collection: &CollectionPath,
        id: &str,
    ) -> impl Future<Output = Result<Option<Document>, StoreError>> + Send;

    /// Merge `fields` into an existing document.
    ///
    /// Fails with [`StoreError::NotFound`] if the document does not exist.
    fn update(
        &self,
        collection: &CollectionPath,
        id: &str,
        fields: Fields,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Delete a document. Deleting a missing document succeeds.
    fn delete(
        &self,
        collection: &CollectionPath,
        id: &str,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Run a one-shot query.
    fn query(&self, query: &Query) -> impl Future<Output = Result<Vec<Document>, StoreError>> + Send;

    /// Open a live query.
    ///
    /// The subscription yields the full matching result set immediately and
    /// again after every change that affects the queried collection.
    fn subscribe(
        &self,
        query: &Query,
    ) -> impl Future<Output = Result<Subscription<Vec<Document>>, StoreError>> + Send;
}
