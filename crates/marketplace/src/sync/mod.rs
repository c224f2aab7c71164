//! Live listing synchronization.
//!
//! [`ListingSync`] owns one product subscription and one review subscription
//! per product currently in view. All of them are polled from the task that
//! calls [`ListingSync::next_update`], one emission at a time, so the
//! [`LiveView`] has a single writer.
//!
//! Review subscriptions are opened before a new product is applied to the
//! view and cancelled when it leaves or when the engine is torn down. A review
//! subscription that cannot be opened is reported once and not retried; that
//! product simply has no reviews in the view.

mod filter;
mod live_view;

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::future::poll_fn;
use std::task::{Context, Poll};

use futures::StreamExt;
use tracing::{debug, info, instrument, warn};

use bazaar_core::ProductId;

use crate::db::{ProductRepository, ProductScope, RepositoryError, ReviewRepository};
use crate::models::{ProductListing, Review};
use crate::store::{DocumentStore, Subscription};

pub use filter::apply_search_filter;
pub use live_view::{ListingEntry, LiveView, ProductDiff};

/// Live product snapshots for a scope, newest first.
///
/// # Errors
///
/// Returns `RepositoryError::Store` if the subscription is rejected.
pub async fn subscribe_products<S: DocumentStore>(
    store: &S,
    scope: &ProductScope,
) -> Result<Subscription<Vec<ProductListing>>, RepositoryError> {
    ProductRepository::new(store).subscribe(scope).await
}

/// Live review snapshots for one product, newest first.
///
/// # Errors
///
/// Returns `RepositoryError::Store` if the subscription is rejected.
pub async fn subscribe_reviews<S: DocumentStore>(
    store: &S,
    product_id: &ProductId,
) -> Result<Subscription<Vec<Review>>, RepositoryError> {
    ReviewRepository::new(store).subscribe_for(product_id).await
}

/// What changed in the view after one emission.
#[derive(Debug)]
pub enum SyncUpdate {
    /// A new product snapshot was applied.
    ProductsChanged {
        added: Vec<ProductId>,
        removed: Vec<ProductId>,
    },
    /// A product's review list was replaced.
    ReviewsChanged { product_id: ProductId },
    /// The product's review subscription could not be opened.
    ReviewSubscriptionFailed {
        product_id: ProductId,
        error: RepositoryError,
    },
}

enum Emission {
    Products(Vec<ProductListing>),
    Reviews(ProductId, Vec<Review>),
    ReviewsEnded(ProductId),
}

/// Keeps a [`LiveView`] current from store subscriptions.
pub struct ListingSync<'a, S> {
    store: &'a S,
    scope: ProductScope,
    products: Subscription<Vec<ProductListing>>,
    reviews: BTreeMap<ProductId, Subscription<Vec<Review>>>,
    failed: HashSet<ProductId>,
    view: LiveView,
    /// Snapshot received but not yet applied to the view.
    staged: Option<Vec<ProductListing>>,
    staged_failures: Vec<SyncUpdate>,
    pending: VecDeque<SyncUpdate>,
}

impl<'a, S: DocumentStore> ListingSync<'a, S> {
    /// Subscribe to the products in `scope`.
    ///
    /// Nothing is in the view until the first [`next_update`](Self::next_update).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the product subscription is rejected.
    #[instrument(skip(store))]
    pub async fn start(store: &'a S, scope: ProductScope) -> Result<Self, RepositoryError> {
        let products = subscribe_products(store, &scope).await?;
        debug!(subscription = %products.id(), "Product subscription opened");
        Ok(Self {
            store,
            scope,
            products,
            reviews: BTreeMap::new(),
            failed: HashSet::new(),
            view: LiveView::new(),
            staged: None,
            staged_failures: Vec::new(),
            pending: VecDeque::new(),
        })
    }

    /// Wait for the next change and apply it to the view.
    ///
    /// Returns `None` once the product subscription has ended.
    ///
    /// # Cancel safety
    ///
    /// This method is cancel safe. A product snapshot is staged before any
    /// review subscription is opened, and it reaches the view only once every
    /// new product has a review subscription. If the future is dropped part
    /// way, the view is unchanged and the next call resumes the staged
    /// snapshot without reopening subscriptions that already opened.
    pub async fn next_update(&mut self) -> Option<SyncUpdate> {
        loop {
            if let Some(update) = self.pending.pop_front() {
                return Some(update);
            }

            if self.staged.is_some() {
                self.open_staged_reviews().await;
                self.commit_staged();
                continue;
            }

            match poll_fn(|cx| self.poll_emission(cx)).await? {
                Emission::Products(snapshot) => self.staged = Some(snapshot),
                Emission::Reviews(product_id, reviews) => {
                    self.view.apply_reviews(product_id.clone(), reviews);
                    self.pending
                        .push_back(SyncUpdate::ReviewsChanged { product_id });
                }
                Emission::ReviewsEnded(product_id) => {
                    debug!(product_id = %product_id, "Review subscription ended");
                    self.reviews.remove(&product_id);
                }
            }
        }
    }

    /// Poll every subscription once, products first.
    fn poll_emission(&mut self, cx: &mut Context<'_>) -> Poll<Option<Emission>> {
        match self.products.poll_next_unpin(cx) {
            Poll::Ready(Some(snapshot)) => return Poll::Ready(Some(Emission::Products(snapshot))),
            Poll::Ready(None) => return Poll::Ready(None),
            Poll::Pending => {}
        }

        for (product_id, subscription) in &mut self.reviews {
            match subscription.poll_next_unpin(cx) {
                Poll::Ready(Some(reviews)) => {
                    return Poll::Ready(Some(Emission::Reviews(product_id.clone(), reviews)));
                }
                Poll::Ready(None) => {
                    return Poll::Ready(Some(Emission::ReviewsEnded(product_id.clone())));
                }
                Poll::Pending => {}
            }
        }

        Poll::Pending
    }

    /// Open review subscriptions for staged products that are new to the
    /// view. Each subscription is recorded as soon as it opens.
    async fn open_staged_reviews(&mut self) {
        let Some(staged) = &self.staged else {
            return;
        };
        let listed: HashSet<&ProductId> = self.view.products().iter().map(|p| &p.id).collect();
        let missing: Vec<ProductId> = staged
            .iter()
            .map(|p| &p.id)
            .filter(|id| !listed.contains(id))
            .filter(|id| !self.reviews.contains_key(*id) && !self.failed.contains(*id))
            .cloned()
            .collect();

        for product_id in missing {
            match subscribe_reviews(self.store, &product_id).await {
                Ok(subscription) => {
                    self.reviews.insert(product_id, subscription);
                }
                Err(error) => {
                    warn!(product_id = %product_id, error = %error, "Review subscription failed");
                    self.failed.insert(product_id.clone());
                    self.staged_failures
                        .push(SyncUpdate::ReviewSubscriptionFailed { product_id, error });
                }
            }
        }
    }

    /// Apply the staged snapshot and cancel review subscriptions of products
    /// that left the view.
    fn commit_staged(&mut self) {
        let Some(snapshot) = self.staged.take() else {
            return;
        };
        let ProductDiff { added, removed } = self.view.apply_products(snapshot);

        for product_id in &removed {
            self.failed.remove(product_id);
            if let Some(subscription) = self.reviews.remove(product_id) {
                debug!(product_id = %product_id, "Cancelling review subscription");
                subscription.cancel();
            }
        }

        self.pending
            .push_back(SyncUpdate::ProductsChanged { added, removed });
        self.pending.extend(self.staged_failures.drain(..));
    }

    /// The composed view.
    #[must_use]
    pub const fn view(&self) -> &LiveView {
        &self.view
    }

    /// Change the search term; the visible subsequence is recomputed at once.
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.view.set_search_term(term);
    }

    #[must_use]
    pub const fn scope(&self) -> &ProductScope {
        &self.scope
    }

    /// Number of open review subscriptions.
    #[must_use]
    pub fn active_review_subscriptions(&self) -> usize {
        self.reviews.len()
    }

    /// Returns `true` if the product's review subscription could not be opened.
    #[must_use]
    pub fn review_subscription_failed(&self, product_id: &ProductId) -> bool {
        self.failed.contains(product_id)
    }

    /// Cancel every subscription, returning how many review subscriptions
    /// were cancelled.
    pub fn teardown(self) -> usize {
        let count = self.reviews.len();
        for (_, subscription) in self.reviews {
            subscription.cancel();
        }
        self.products.cancel();
        info!(scope = ?self.scope, review_subscriptions = count, "Listing sync torn down");
        count
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};

    use bazaar_core::{Price, UserId};

    use futures::FutureExt;

    use super::*;
    use crate::models::{NewProduct, NewReview};
    use crate::store::{CollectionPath, Document, Fields, MemoryStore, Query, StoreError};

    /// Memory store whose live queries take one extra poll to open.
    struct SlowSubscribeStore(MemoryStore);

    async fn yield_once() {
        let mut yielded = false;
        poll_fn(|cx| {
            if yielded {
                Poll::Ready(())
            } else {
                yielded = true;
                cx.waker().wake_by_ref();
                Poll::Pending
            }
        })
        .await;
    }

    impl DocumentStore for SlowSubscribeStore {
        async fn create(
            &self,
            collection: &CollectionPath,
            fields: Fields,
        ) -> Result<String, StoreError> {
            self.0.create(collection, fields).await
        }

        async fn set(
            &self,
            collection: &CollectionPath,
            id: &str,
            fields: Fields,
        ) -> Result<(), StoreError> {
            self.0.set(collection, id, fields).await
        }

        async fn get(
            &self,
            collection: &CollectionPath,
            id: &str,
        ) -> Result<Option<Document>, StoreError> {
            self.0.get(collection, id).await
        }

        async fn update(
            &self,
            collection: &CollectionPath,
            id: &str,
            fields: Fields,
        ) -> Result<(), StoreError> {
            self.0.update(collection, id, fields).await
        }

        async fn delete(&self, collection: &CollectionPath, id: &str) -> Result<(), StoreError> {
            self.0.delete(collection, id).await
        }

        async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
            self.0.query(query).await
        }

        async fn subscribe(
            &self,
            query: &Query,
        ) -> Result<Subscription<Vec<Document>>, StoreError> {
            yield_once().await;
            self.0.subscribe(query).await
        }
    }

    fn new_product(name: &str, supplier: &str, created_ms: i64) -> NewProduct {
        NewProduct {
            name: name.to_owned(),
            price: Price::parse("40").unwrap(),
            quantity: 5,
            description: String::new(),
            supplier_id: UserId::new(supplier),
            created_at: Utc.timestamp_millis_opt(created_ms).unwrap(),
            location: None,
            address: None,
        }
    }

    #[tokio::test]
    async fn test_initial_snapshot_opens_review_subscriptions() {
        let store = MemoryStore::new();
        let products = ProductRepository::new(&store);
        let rice = products.create(new_product("Rice", "s1", 1)).await.unwrap();
        products.create(new_product("Dal", "s1", 2)).await.unwrap();

        let mut sync = ListingSync::start(&store, ProductScope::All).await.unwrap();
        match sync.next_update().await.unwrap() {
            SyncUpdate::ProductsChanged { added, removed } => {
                assert_eq!(added.len(), 2);
                assert!(removed.is_empty());
            }
            other => panic!("unexpected update: {other:?}"),
        }
        assert_eq!(sync.active_review_subscriptions(), 2);

        // Newest first.
        let names: Vec<_> = sync.view().products().iter().map(|p| p.name.clone()).collect();
        assert_eq!(names, ["Dal", "Rice"]);

        // Each review subscription delivers its initial (empty) list.
        for _ in 0..2 {
            assert!(matches!(
                sync.next_update().await.unwrap(),
                SyncUpdate::ReviewsChanged { .. }
            ));
        }
        assert_eq!(sync.view().entry(&rice.id).unwrap().reviews, Some(&[][..]));
    }

    #[tokio::test]
    async fn test_removed_product_cancels_its_review_subscription() {
        let store = MemoryStore::new();
        let products = ProductRepository::new(&store);
        let rice = products.create(new_product("Rice", "s1", 1)).await.unwrap();

        let mut sync = ListingSync::start(&store, ProductScope::All).await.unwrap();
        sync.next_update().await.unwrap();
        sync.next_update().await.unwrap();

        products.delete(&rice.id).await.unwrap();
        match sync.next_update().await.unwrap() {
            SyncUpdate::ProductsChanged { removed, .. } => assert_eq!(removed, [rice.id.clone()]),
            other => panic!("unexpected update: {other:?}"),
        }
        assert_eq!(sync.active_review_subscriptions(), 0);
        assert_eq!(store.cancellations(&CollectionPath::reviews()), 1);
    }

    #[tokio::test]
    async fn test_review_written_later_reaches_view() {
        let store = MemoryStore::new();
        let rice = ProductRepository::new(&store)
            .create(new_product("Rice", "s1", 1))
            .await
            .unwrap();

        let mut sync = ListingSync::start(&store, ProductScope::All).await.unwrap();
        sync.next_update().await.unwrap();
        sync.next_update().await.unwrap();

        ReviewRepository::new(&store)
            .create(NewReview {
                product_id: rice.id.clone(),
                text: "Good".into(),
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        match sync.next_update().await.unwrap() {
            SyncUpdate::ReviewsChanged { product_id } => assert_eq!(product_id, rice.id),
            other => panic!("unexpected update: {other:?}"),
        }
        let entry = sync.view().entry(&rice.id).unwrap();
        assert_eq!(entry.reviews.unwrap()[0].text, "Good");
    }

    #[tokio::test]
    async fn test_review_subscription_failure_is_isolated() {
        let store = MemoryStore::new();
        let products = ProductRepository::new(&store);
        let rice = products.create(new_product("Rice", "s1", 1)).await.unwrap();
        let dal = products.create(new_product("Dal", "s1", 2)).await.unwrap();
        store.deny_reads_where(CollectionPath::reviews(), "productId", dal.id.as_str());

        let mut sync = ListingSync::start(&store, ProductScope::All).await.unwrap();
        assert!(matches!(
            sync.next_update().await.unwrap(),
            SyncUpdate::ProductsChanged { .. }
        ));
        match sync.next_update().await.unwrap() {
            SyncUpdate::ReviewSubscriptionFailed { product_id, .. } => assert_eq!(product_id, dal.id),
            other => panic!("unexpected update: {other:?}"),
        }
        assert!(sync.review_subscription_failed(&dal.id));
        assert_eq!(sync.active_review_subscriptions(), 1);

        // The other product still gets its reviews.
        sync.next_update().await.unwrap();
        assert!(sync.view().entry(&rice.id).unwrap().reviews.is_some());
        assert!(sync.view().entry(&dal.id).unwrap().reviews.is_none());
    }

    #[tokio::test]
    async fn test_dropped_update_resumes_staged_snapshot() {
        let store = SlowSubscribeStore(MemoryStore::new());
        let products = ProductRepository::new(&store.0);
        products.create(new_product("Rice", "s1", 1)).await.unwrap();
        products.create(new_product("Dal", "s1", 2)).await.unwrap();

        let mut sync = ListingSync::start(&store, ProductScope::All).await.unwrap();

        // The first poll receives the snapshot and stops while opening a
        // review subscription; dropping it must not touch the view.
        assert!(sync.next_update().now_or_never().is_none());
        assert!(sync.view().products().is_empty());

        match sync.next_update().await.unwrap() {
            SyncUpdate::ProductsChanged { added, removed } => {
                assert_eq!(added.len(), 2);
                assert!(removed.is_empty());
            }
            other => panic!("unexpected update: {other:?}"),
        }
        assert_eq!(sync.view().products().len(), 2);
        assert_eq!(sync.active_review_subscriptions(), 2);
        assert_eq!(store.0.active_subscriptions(), 3);

        for _ in 0..2 {
            assert!(matches!(
                sync.next_update().await.unwrap(),
                SyncUpdate::ReviewsChanged { .. }
            ));
        }
        assert_eq!(sync.teardown(), 2);
        assert_eq!(store.0.active_subscriptions(), 0);
    }

    #[tokio::test]
    async fn test_supplier_scope() {
        let store = MemoryStore::new();
        let products = ProductRepository::new(&store);
        products.create(new_product("Rice", "s1", 1)).await.unwrap();
        products.create(new_product("Dal", "s2", 2)).await.unwrap();

        let mut sync = ListingSync::start(&store, ProductScope::Supplier(UserId::new("s1")))
            .await
            .unwrap();
        sync.next_update().await.unwrap();
        let names: Vec<_> = sync.view().products().iter().map(|p| p.name.clone()).collect();
        assert_eq!(names, ["Rice"]);
    }

    #[tokio::test]
    async fn test_teardown_cancels_exactly_active_subscriptions() {
        let store = MemoryStore::new();
        let products = ProductRepository::new(&store);
        for i in 0..3 {
            products.create(new_product(&format!("P{i}"), "s1", i)).await.unwrap();
        }

        let mut sync = ListingSync::start(&store, ProductScope::All).await.unwrap();
        sync.next_update().await.unwrap();

        assert_eq!(sync.teardown(), 3);
        assert_eq!(store.cancellations(&CollectionPath::reviews()), 3);
        assert_eq!(store.cancellations(&CollectionPath::products()), 1);
        assert_eq!(store.active_subscriptions(), 0);
    }
}
