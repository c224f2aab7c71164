//! User record repository.

use bazaar_core::UserId;

use super::{RepositoryError, decode, encode};
use crate::models::UserRecord;
use crate::store::{CollectionPath, DocumentStore};

/// Repository for the `users` collection.
pub struct UserRepository<'a, S> {
    store: &'a S,
}

impl<'a, S: DocumentStore> UserRepository<'a, S> {
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Write the record under its uid, replacing anything already there.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the write is rejected.
    pub async fn create(&self, record: &UserRecord) -> Result<(), RepositoryError> {
        let mut fields = encode(record)?;
        // The uid is both the document id and a field, for client lookups.
        fields.insert("uid".to_owned(), record.uid.as_str().into());
        self.store
            .set(&CollectionPath::users(), record.uid.as_str(), fields)
            .await?;
        Ok(())
    }

    /// Get a user record by uid.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the read fails.
    /// Returns `RepositoryError::DataCorruption` if the stored record is invalid.
    pub async fn get(&self, uid: &UserId) -> Result<Option<UserRecord>, RepositoryError> {
        self.store
            .get(&CollectionPath::users(), uid.as_str())
            .await?
            .map(|mut doc| {
                doc.fields
                    .entry("uid")
                    .or_insert_with(|| uid.as_str().into());
                decode(doc)
            })
            .transpose()
    }
}
