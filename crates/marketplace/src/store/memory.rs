//! In-process document store.
//!
//! Backs tests and local development. Live queries are fed through unbounded
//! channels: every write re-evaluates the queries listening on the written
//! collection and pushes a fresh snapshot to each.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use futures::channel::mpsc;
use serde_json::Value;
use tracing::debug;

use super::{
    CollectionPath, Document, DocumentStore, Fields, Query, StoreError, Subscription,
    SubscriptionHandle,
};

struct Listener {
    key: u64,
    query: Query,
    tx: mpsc::UnboundedSender<Vec<Document>>,
}

struct DeniedRead {
    collection: CollectionPath,
    field: String,
    value: Value,
}

#[derive(Default)]
struct Inner {
    collections: HashMap<CollectionPath, BTreeMap<String, Fields>>,
    listeners: Vec<Listener>,
    next_listener: u64,
    cancellations: HashMap<CollectionPath, usize>,
    denied_reads: Vec<DeniedRead>,
    denied_writes: HashSet<CollectionPath>,
}

impl Inner {
    fn snapshot(&self, query: &Query) -> Vec<Document> {
        let docs = self
            .collections
            .get(&query.collection)
            .into_iter()
            .flatten()
            .map(|(id, fields)| Document {
                id: id.clone(),
                fields: fields.clone(),
            });
        query.evaluate(docs)
    }

    fn check_read(&self, query: &Query) -> Result<(), StoreError> {
        let denied = self
            .denied_reads
            .iter()
            .any(|d| d.collection == query.collection && query.has_filter(&d.field, &d.value));
        if denied {
            return Err(StoreError::PermissionDenied);
        }
        Ok(())
    }

    fn check_write(&self, collection: &CollectionPath) -> Result<(), StoreError> {
        if self.denied_writes.contains(collection) {
            return Err(StoreError::PermissionDenied);
        }
        Ok(())
    }

    fn notify(&mut self, collection: &CollectionPath) {
        let snapshots: Vec<(u64, Vec<Document>)> = self
            .listeners
            .iter()
            .filter(|l| &l.query.collection == collection)
            .map(|l| (l.key, self.snapshot(&l.query)))
            .collect();

        for (key, snapshot) in snapshots {
            if let Some(listener) = self.listeners.iter().find(|l| l.key == key) {
                // A closed receiver means the consumer is gone; its handle
                // removes the listener when it is cancelled.
                let _ = listener.tx.unbounded_send(snapshot);
            }
        }
    }
}

/// Document store held entirely in memory.
///
/// Cheap to clone; clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("Lock poisoned".to_string()))
    }

    /// Reject queries and subscriptions on `collection` that filter on
    /// `field == value`.
    pub fn deny_reads_where(&self, collection: CollectionPath, field: &str, value: impl Into<Value>) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.denied_reads.push(DeniedRead {
                collection,
                field: field.to_owned(),
                value: value.into(),
            });
        }
    }

    /// Reject every write to `collection`.
    pub fn deny_writes(&self, collection: CollectionPath) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.denied_writes.insert(collection);
        }
    }

    /// Lift a previous [`deny_writes`](Self::deny_writes).
    pub fn allow_writes(&self, collection: &CollectionPath) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.denied_writes.remove(collection);
        }
    }

    /// Number of live listeners across all collections.
    #[must_use]
    pub fn active_subscriptions(&self) -> usize {
        self.inner.lock().map_or(0, |inner| inner.listeners.len())
    }

    /// Number of live listeners on one collection.
    #[must_use]
    pub fn active_subscriptions_on(&self, collection: &CollectionPath) -> usize {
        self.inner.lock().map_or(0, |inner| {
            inner
                .listeners
                .iter()
                .filter(|l| &l.query.collection == collection)
                .count()
        })
    }

    /// How many listeners on `collection` have been cancelled so far.
    #[must_use]
    pub fn cancellations(&self, collection: &CollectionPath) -> usize {
        self.inner.lock().map_or(0, |inner| {
            inner.cancellations.get(collection).copied().unwrap_or(0)
        })
    }

    /// Number of documents in a collection.
    #[must_use]
    pub fn count(&self, collection: &CollectionPath) -> usize {
        self.inner.lock().map_or(0, |inner| {
            inner.collections.get(collection).map_or(0, BTreeMap::len)
        })
    }
}

fn cancel_listener(inner: &Weak<Mutex<Inner>>, key: u64, collection: &CollectionPath) {
    let Some(inner) = inner.upgrade() else {
        return;
    };
    let Ok(mut inner) = inner.lock() else {
        return;
    };
    let before = inner.listeners.len();
    inner.listeners.retain(|l| l.key != key);
    if inner.listeners.len() < before {
        *inner.cancellations.entry(collection.clone()).or_default() += 1;
        debug!(collection = %collection, key, "Listener cancelled");
    }
}

impl DocumentStore for MemoryStore {
    async fn create(&self, collection: &CollectionPath, fields: Fields) -> Result<String, StoreError> {
        let mut inner = self.lock()?;
        inner.check_write(collection)?;
        let id = uuid::Uuid::new_v4().simple().to_string();
        inner
            .collections
            .entry(collection.clone())
            .or_default()
            .insert(id.clone(), fields);
        inner.notify(collection);
        Ok(id)
    }

    async fn set(&self, collection: &CollectionPath, id: &str, fields: Fields) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        inner.check_write(collection)?;
        inner
            .collections
            .entry(collection.clone())
            .or_default()
            .insert(id.to_owned(), fields);
        inner.notify(collection);
        Ok(())
    }

    async fn get(&self, collection: &CollectionPath, id: &str) -> Result<Option<Document>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|fields| Document {
                id: id.to_owned(),
                fields: fields.clone(),
            }))
    }

    async fn update(&self, collection: &CollectionPath, id: &str, fields: Fields) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        inner.check_write(collection)?;
        let existing = inner
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_owned(),
            })?;
        existing.extend(fields);
        inner.notify(collection);
        Ok(())
    }

    async fn delete(&self, collection: &CollectionPath, id: &str) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        inner.check_write(collection)?;
        let removed = inner
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.remove(id));
        if removed.is_some() {
            inner.notify(collection);
        }
        Ok(())
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        let inner = self.lock()?;
        inner.check_read(query)?;
        Ok(inner.snapshot(query))
    }

    async fn subscribe(&self, query: &Query) -> Result<Subscription<Vec<Document>>, StoreError> {
        let mut inner = self.lock()?;
        inner.check_read(query)?;

        let (tx, rx) = mpsc::unbounded();
        // The initial snapshot is queued before the listener is visible to
        // writers, so it is always the first item on the stream.
        let _ = tx.unbounded_send(inner.snapshot(query));

        let key = inner.next_listener;
        inner.next_listener += 1;
        inner.listeners.push(Listener {
            key,
            query: query.clone(),
            tx,
        });
        drop(inner);

        let weak = Arc::downgrade(&self.inner);
        let collection = query.collection.clone();
        let handle = SubscriptionHandle::new(move || cancel_listener(&weak, key, &collection));
        debug!(collection = %query.collection, key, "Listener attached");

        Ok(Subscription::new(handle, rx))
    }
}
