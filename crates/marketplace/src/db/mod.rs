//! Typed repositories over the document store.
//!
//! # Collections
//!
//! - `users` - [`UserRecord`](crate::models::UserRecord), keyed by uid
//! - `products` - [`ProductListing`](crate::models::ProductListing)
//! - `reviews` - [`Review`](crate::models::Review)
//! - `users/{uid}/addresses` - [`Address`](crate::models::Address)
//!
//! This is the only layer that sees untyped document fields. A document
//! that no longer decodes is reported as [`RepositoryError::DataCorruption`]
//! on single reads and skipped (with a warning) in listings.

pub mod addresses;
pub mod products;
pub mod reviews;
pub mod users;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::store::{Document, Fields, StoreError};

pub use addresses::AddressRepository;
pub use products::{ProductRepository, ProductScope};
pub use reviews::ReviewRepository;
pub use users::UserRepository;

/// Field every document's id is exposed under when decoding.
const ID_FIELD: &str = "id";

/// Error type for repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Error from the document store.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A stored document does not match its model.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested document was not found.
    #[error("not found")]
    NotFound,

    /// The model could not be turned into a document.
    #[error("could not encode document: {0}")]
    Encode(String),
}

/// Decode a stored document into a model, exposing the document id as `id`.
pub(crate) fn decode<T: DeserializeOwned>(doc: Document) -> Result<T, RepositoryError> {
    let Document { id, mut fields } = doc;
    fields
        .entry(ID_FIELD)
        .or_insert_with(|| Value::String(id.clone()));
    serde_json::from_value(Value::Object(fields))
        .map_err(|e| RepositoryError::DataCorruption(format!("document {id}: {e}")))
}

/// Decode every document in a snapshot, skipping those that fail.
pub(crate) fn decode_all<T: DeserializeOwned>(docs: Vec<Document>) -> Vec<T> {
    docs.into_iter()
        .filter_map(|doc| match decode(doc) {
            Ok(model) => Some(model),
            Err(e) => {
                warn!(error = %e, "Skipping undecodable document");
                None
            }
        })
        .collect()
}

/// Encode a model into document fields. The id lives in the path, not the body.
pub(crate) fn encode<T: Serialize>(model: &T) -> Result<Fields, RepositoryError> {
    match serde_json::to_value(model) {
        Ok(Value::Object(mut fields)) => {
            fields.remove(ID_FIELD);
            Ok(fields)
        }
        Ok(other) => Err(RepositoryError::Encode(format!(
            "expected an object, got {other}"
        ))),
        Err(e) => Err(RepositoryError::Encode(e.to_string())),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Thing {
        id: String,
        name: String,
    }

    #[test]
    fn test_decode_injects_id() {
        let doc = Document {
            id: "t1".into(),
            fields: json!({"name": "x"}).as_object().cloned().unwrap(),
        };
        let thing: Thing = decode(doc).unwrap();
        assert_eq!(thing.id, "t1");
    }

    #[test]
    fn test_encode_strips_id() {
        let fields = encode(&Thing {
            id: "t1".into(),
            name: "x".into(),
        })
        .unwrap();
        assert!(!fields.contains_key("id"));
        assert_eq!(fields["name"], "x");
    }

    #[test]
    fn test_decode_reports_corruption() {
        let doc = Document {
            id: "t1".into(),
            fields: Fields::new(),
        };
        let err = decode::<Thing>(doc).unwrap_err();
        assert!(matches!(err, RepositoryError::DataCorruption(_)));
    }

    #[test]
    fn test_decode_all_skips_bad_documents() {
        let good = Document {
            id: "a".into(),
            fields: json!({"name": "x"}).as_object().cloned().unwrap(),
        };
        let bad = Document {
            id: "b".into(),
            fields: Fields::new(),
        };
        let things: Vec<Thing> = decode_all(vec![good, bad]);
        assert_eq!(things.len(), 1);
    }
}
