//! Key-addressed query cache.
//!
//! [`QueryCache`] memoizes the result of a `(key, async producer)` pair,
//! deduplicates concurrent requests for the same key, and marks entries
//! stale on invalidation so the next read refetches.
//!
//! Guarantees:
//!
//! - **Single-flight**: at most one producer runs per key at any time;
//!   every caller awaiting that key receives the same resolved value or
//!   the same error.
//! - **Failure leaves no value**: a failed producer evicts the entry, so
//!   the next read retries from scratch and other keys stay untouched.
//! - **Cancellation-safe**: the producer runs in a spawned task, so a
//!   caller that stops awaiting does not abort the flight — the result
//!   still settles the cache, it just goes unobserved.
//!
//! The cache is explicit shared state: construct one per application
//! session and hand an `Arc` of it to every accessor and mutation. Cached
//! values are exclusively owned here and handed out as `Arc<T>` snapshots;
//! callers never mutate them in place.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use log::debug;
use tokio::sync::watch;

use crate::error::SyncError;
use crate::keys::QueryKey;

type Shared = Arc<dyn Any + Send + Sync>;
type Outcome = Result<Shared, SyncError>;

enum Entry {
    /// Resolved value. `stale` forces the next read to refetch; the value
    /// remains peekable in the meantime.
    Ready { value: Shared, stale: bool },
    /// Producer in flight; waiters subscribe to the channel.
    InFlight(watch::Receiver<Option<Outcome>>),
}

/// Process-wide store of query results, addressed by [`QueryKey`].
#[derive(Default)]
pub struct QueryCache {
    entries: Mutex<HashMap<QueryKey, Entry>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `key`, running `producer` only on a miss or stale entry.
    ///
    /// A fresh entry is returned immediately. If a request for the same
    /// key is already in flight the caller attaches to it instead of
    /// issuing a duplicate. Otherwise the producer is spawned, its success
    /// stored under `key`, and its failure propagated to every waiter
    /// while the entry is dropped.
    pub async fn read<T, F, Fut>(
        self: &Arc<Self>,
        key: QueryKey,
        producer: F,
    ) -> Result<Arc<T>, SyncError>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, SyncError>> + Send + 'static,
    {
        let mut rx = {
            let mut entries = self.entries.lock().unwrap();
            match entries.get(&key) {
                Some(Entry::Ready { value, stale }) if !*stale => {
                    debug!("cache hit: {}", key);
                    return Ok(downcast::<T>(value.clone()));
                }
                Some(Entry::InFlight(rx)) => {
                    debug!("cache join: {}", key);
                    rx.clone()
                }
                _ => {
                    debug!("cache miss: {}", key);
                    let (tx, rx) = watch::channel(None);
                    entries.insert(key.clone(), Entry::InFlight(rx.clone()));
                    let cache = Arc::clone(self);
                    let flight_key = key.clone();
                    let fut = producer();
                    tokio::spawn(async move {
                        let outcome: Outcome = match fut.await {
                            Ok(value) => {
                                let shared: Shared = Arc::new(value);
                                let mut entries = cache.entries.lock().unwrap();
                                entries.insert(
                                    flight_key,
                                    Entry::Ready {
                                        value: shared.clone(),
                                        stale: false,
                                    },
                                );
                                Ok(shared)
                            }
                            Err(err) => {
                                let mut entries = cache.entries.lock().unwrap();
                                entries.remove(&flight_key);
                                Err(err)
                            }
                        };
                        let _ = tx.send(Some(outcome));
                    });
                    rx
                }
            }
        };

        loop {
            let settled = rx.borrow_and_update().clone();
            if let Some(outcome) = settled {
                return outcome.map(downcast::<T>);
            }
            if rx.changed().await.is_err() {
                // Producer task died without settling; treat as a lost request.
                return Err(SyncError::Network {
                    message: format!("request for {} was abandoned", key),
                });
            }
        }
    }

    /// Current resolved value for `key`, fresh or stale. Never fetches.
    pub fn peek<T: Send + Sync + 'static>(&self, key: &QueryKey) -> Option<Arc<T>> {
        let entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some(Entry::Ready { value, .. }) => Some(downcast::<T>(value.clone())),
            _ => None,
        }
    }

    /// Mark every key under `prefix` stale. The next read for any of them
    /// re-runs its producer; fresh entries elsewhere are untouched.
    pub fn invalidate(&self, prefix: &QueryKey) {
        let mut entries = self.entries.lock().unwrap();
        for (key, entry) in entries.iter_mut() {
            if key.starts_with(prefix) {
                if let Entry::Ready { stale, .. } = entry {
                    debug!("cache invalidate: {}", key);
                    *stale = true;
                }
            }
        }
    }

    /// Delete every key under `prefix` outright. Used when the underlying
    /// entity no longer exists, so not even a stale value should remain.
    pub fn remove(&self, prefix: &QueryKey) {
        let mut entries = self.entries.lock().unwrap();
        entries.retain(|key, _| {
            let keep = !key.starts_with(prefix);
            if !keep {
                debug!("cache remove: {}", key);
            }
            keep
        });
    }

    /// Whether any entry (resolved or in flight) exists for exactly `key`.
    pub fn contains(&self, key: &QueryKey) -> bool {
        self.entries.lock().unwrap().contains_key(key)
    }

    /// Freshness of a resolved entry; `None` if absent or still in flight.
    pub fn is_fresh(&self, key: &QueryKey) -> Option<bool> {
        let entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some(Entry::Ready { stale, .. }) => Some(!*stale),
            _ => None,
        }
    }
}

/// A key is paired with exactly one result type by construction, so a
/// mismatch here is a programming error rather than a runtime condition.
fn downcast<T: Send + Sync + 'static>(value: Shared) -> Arc<T> {
    value
        .downcast::<T>()
        .unwrap_or_else(|_| panic!("query key reused with a different result type"))
}
