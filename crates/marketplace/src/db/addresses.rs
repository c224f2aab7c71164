//! Address book repository.

use bazaar_core::{AddressId, UserId};

use super::{RepositoryError, decode_all, encode};
use crate::models::{Address, AddressDetails};
use crate::store::{CollectionPath, DocumentStore, Query, StoreError};

/// Repository for a user's `addresses` sub-collection.
pub struct AddressRepository<'a, S> {
    store: &'a S,
    collection: CollectionPath,
}

impl<'a, S: DocumentStore> AddressRepository<'a, S> {
    #[must_use]
    pub fn new(store: &'a S, uid: &UserId) -> Self {
        Self {
            store,
            collection: CollectionPath::addresses(uid),
        }
    }

    /// All saved addresses, in id order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the query fails.
    pub async fn list(&self) -> Result<Vec<Address>, RepositoryError> {
        let docs = self
            .store
            .query(&Query::collection(self.collection.clone()))
            .await?;
        Ok(decode_all(docs))
    }

    /// Save a new address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the write is rejected.
    pub async fn create(&self, details: AddressDetails) -> Result<Address, RepositoryError> {
        let fields = encode(&details)?;
        let id = self.store.create(&self.collection, fields).await?;
        Ok(Address {
            id: AddressId::new(id),
            details,
        })
    }

    /// Replace the details of a saved address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address does not exist.
    /// Returns `RepositoryError::Store` for other store failures.
    pub async fn update(&self, id: &AddressId, details: &AddressDetails) -> Result<(), RepositoryError> {
        let fields = encode(details)?;
        self.store
            .update(&self.collection, id.as_str(), fields)
            .await
            .map_err(|e| match e {
                StoreError::NotFound { .. } => RepositoryError::NotFound,
                other => RepositoryError::Store(other),
            })
    }

    /// Remove a saved address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the delete is rejected.
    pub async fn delete(&self, id: &AddressId) -> Result<(), RepositoryError> {
        self.store.delete(&self.collection, id.as_str()).await?;
        Ok(())
    }
}
