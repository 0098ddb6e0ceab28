//! TTL-based snapshot cache with per-scope single-flight refresh.
//!
//! The cache owns the only mutable shared state in the system: the latest
//! [`Snapshot`] per [`Scope`]. Reads are lock-free; refreshes serialize per
//! scope so that at most one fetch is in flight for a stale scope at a time.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::domain::{Rate, Scope, Snapshot};
use crate::error::FetchError;

/// Snapshot cache keyed by scope.
///
/// Distinct scopes never contend; operations on the same scope serialize
/// through a per-scope refresh lock. A second caller that finds its scope
/// stale waits for the in-flight refresh and then returns its result
/// without fetching again.
#[derive(Default)]
pub struct RateCache {
    entries: DashMap<Scope, Snapshot>,
    refresh_locks: DashMap<Scope, Arc<Mutex<()>>>,
}

impl RateCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-blocking read of the cached snapshot for a scope.
    ///
    /// Never triggers a fetch and makes no freshness judgement.
    #[must_use]
    pub fn get(&self, scope: Scope) -> Option<Snapshot> {
        self.entries.get(&scope).map(|entry| entry.value().clone())
    }

    /// Store a snapshot, enforcing monotonic write ordering per scope.
    ///
    /// A snapshot whose `fetched_at` is not strictly newer than the stored
    /// entry's is discarded, so a slow stale fetch response can never clobber
    /// a newer one. Returns whether the snapshot was stored.
    pub fn store(&self, scope: Scope, snapshot: Snapshot) -> bool {
        match self.entries.entry(scope) {
            Entry::Occupied(mut occupied) => {
                if snapshot.fetched_at <= occupied.get().fetched_at {
                    warn!(
                        scope = %scope,
                        incoming = %snapshot.fetched_at,
                        stored = %occupied.get().fetched_at,
                        "discarding out-of-order snapshot write"
                    );
                    return false;
                }
                occupied.insert(snapshot);
                true
            }
            Entry::Vacant(vacant) => {
                vacant.insert(snapshot);
                true
            }
        }
    }

    /// Return the cached snapshot if it is younger than `ttl`, otherwise
    /// fetch, store, and return a new one.
    ///
    /// On fetch failure the stale entry is left untouched and the error is
    /// returned; serving stale data anyway is the caller's decision.
    ///
    /// # Errors
    ///
    /// Propagates the [`FetchError`] from `fetch` when a refresh is needed
    /// and fails.
    pub async fn get_or_refresh<F, Fut>(
        &self,
        scope: Scope,
        ttl: Duration,
        fetch: F,
    ) -> Result<Snapshot, FetchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<Rate>, FetchError>>,
    {
        if let Some(snapshot) = self.fresh(scope, ttl) {
            return Ok(snapshot);
        }

        let lock = self.refresh_lock(scope);
        let _guard = lock.lock().await;

        // A concurrent caller may have refreshed while we waited for the lock.
        if let Some(snapshot) = self.fresh(scope, ttl) {
            debug!(scope = %scope, "refresh already done by concurrent caller");
            return Ok(snapshot);
        }

        let rates = fetch().await?;
        let snapshot = Snapshot::new(rates, Utc::now());
        self.store(scope, snapshot.clone());
        Ok(snapshot)
    }

    /// Number of scopes with a cached snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn fresh(&self, scope: Scope, ttl: Duration) -> Option<Snapshot> {
        self.entries
            .get(&scope)
            .filter(|entry| entry.value().is_fresh(ttl))
            .map(|entry| entry.value().clone())
    }

    fn refresh_lock(&self, scope: Scope) -> Arc<Mutex<()>> {
        self.refresh_locks
            .entry(scope)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit;

    #[test]
    fn get_returns_none_for_unknown_scope() {
        let cache = RateCache::new();
        assert!(cache.get(Scope::Global).is_none());
    }

    #[test]
    fn store_and_get_round_trip() {
        let cache = RateCache::new();
        let snapshot = testkit::domain::snapshot(vec![testkit::domain::usd_uah_rate()]);

        assert!(cache.store(Scope::Global, snapshot.clone()));
        assert_eq!(cache.get(Scope::Global), Some(snapshot));
    }

    #[test]
    fn store_rejects_older_fetched_at() {
        let cache = RateCache::new();
        let newer = testkit::domain::snapshot_aged(vec![], Duration::from_secs(0));
        let older = testkit::domain::snapshot_aged(vec![], Duration::from_secs(60));

        assert!(cache.store(Scope::Global, newer.clone()));
        assert!(!cache.store(Scope::Global, older));
        assert_eq!(cache.get(Scope::Global), Some(newer));
    }

    #[test]
    fn store_rejects_equal_fetched_at() {
        let cache = RateCache::new();
        let snapshot = testkit::domain::snapshot(vec![]);

        assert!(cache.store(Scope::Global, snapshot.clone()));
        assert!(!cache.store(Scope::Global, snapshot));
    }

    #[test]
    fn scopes_are_independent() {
        let cache = RateCache::new();
        let sub = Scope::Subscriber(testkit::domain::subscriber(1));

        cache.store(Scope::Global, testkit::domain::snapshot(vec![]));
        assert!(cache.get(sub).is_none());
        assert_eq!(cache.len(), 1);
    }
}
