//! Live query subscriptions.
//!
//! A [`Subscription`] pairs a stream of snapshots with a
//! [`SubscriptionHandle`]. Cancelling the handle (explicitly or by dropping
//! it) detaches the listener from the collaborator; the stream then ends.

use std::fmt;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};

use futures::stream::{BoxStream, Stream, StreamExt};

static NEXT_SUBSCRIPTION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique subscription identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Allocate a fresh id.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_SUBSCRIPTION_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

type CancelFn = Box<dyn FnOnce() + Send + Sync>;

/// Cancellation handle for a live listener.
///
/// The cancel callback runs at most once, either from [`cancel`](Self::cancel)
/// or from `Drop`.
pub struct SubscriptionHandle {
    id: SubscriptionId,
    on_cancel: Option<CancelFn>,
}

impl SubscriptionHandle {
    pub fn new(on_cancel: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            id: SubscriptionId::next(),
            on_cancel: Some(Box::new(on_cancel)),
        }
    }

    /// A handle with nothing to detach, for streams that end on their own.
    #[must_use]
    pub fn detached() -> Self {
        Self {
            id: SubscriptionId::next(),
            on_cancel: None,
        }
    }

    #[must_use]
    pub const fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Detach the listener.
    pub fn cancel(mut self) {
        self.run_cancel();
    }

    fn run_cancel(&mut self) {
        if let Some(on_cancel) = self.on_cancel.take() {
            on_cancel();
        }
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.run_cancel();
    }
}

impl fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("id", &self.id)
            .field("active", &self.on_cancel.is_some())
            .finish()
    }
}

/// A stream of snapshots plus the handle that ends it.
pub struct Subscription<T> {
    handle: SubscriptionHandle,
    stream: BoxStream<'static, T>,
}

impl<T: Send + 'static> Subscription<T> {
    pub fn new(handle: SubscriptionHandle, stream: impl Stream<Item = T> + Send + 'static) -> Self {
        Self {
            handle,
            stream: stream.boxed(),
        }
    }

    /// Transform each snapshot, keeping the same handle.
    #[must_use]
    pub fn map<U: Send + 'static>(
        self,
        f: impl FnMut(T) -> U + Send + 'static,
    ) -> Subscription<U> {
        Subscription {
            handle: self.handle,
            stream: self.stream.map(f).boxed(),
        }
    }

    #[must_use]
    pub const fn id(&self) -> SubscriptionId {
        self.handle.id()
    }

    /// Wait for the next snapshot. `None` once the subscription has ended.
    pub async fn next(&mut self) -> Option<T> {
        self.stream.next().await
    }

    /// Detach the listener and drop any buffered snapshots.
    pub fn cancel(self) {
        self.handle.cancel();
    }

    /// Split into the handle and the raw stream.
    #[must_use]
    pub fn into_parts(self) -> (SubscriptionHandle, BoxStream<'static, T>) {
        (self.handle, self.stream)
    }
}

impl<T> Stream for Subscription<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.stream.as_mut().poll_next(cx)
    }
}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}
