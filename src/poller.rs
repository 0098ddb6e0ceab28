//! Periodic fetch-compare-store-notify cycle.
//!
//! One background task drives all scopes. Ticks never overlap: the interval
//! uses [`MissedTickBehavior::Delay`], and each tick processes its scopes to
//! completion before the next tick is observed.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::cache::RateCache;
use crate::config::CacheMode;
use crate::domain::{snapshot_changed, Rate, Scope, Snapshot};
use crate::error::FetchError;
use crate::port::RateSource;
use crate::registry::SubscriptionRegistry;
use crate::router::NotificationRouter;

/// Runtime settings for the poller.
#[derive(Debug, Clone)]
pub struct PollerSettings {
    /// Time between background fetch cycles.
    pub interval: Duration,
    /// Delay before the single retry after a rate-limited fetch.
    pub rate_limit_retry: Duration,
    /// Which scopes a tick iterates over.
    pub mode: CacheMode,
}

/// Drives the background fetch-compare-store-notify cycle.
pub struct Poller {
    cache: Arc<RateCache>,
    registry: Arc<SubscriptionRegistry>,
    router: Arc<NotificationRouter>,
    source: Arc<dyn RateSource>,
    settings: PollerSettings,
}

impl Poller {
    #[must_use]
    pub fn new(
        cache: Arc<RateCache>,
        registry: Arc<SubscriptionRegistry>,
        router: Arc<NotificationRouter>,
        source: Arc<dyn RateSource>,
        settings: PollerSettings,
    ) -> Self {
        Self {
            cache,
            registry,
            router,
            source,
            settings,
        }
    }

    /// Run the periodic loop until shutdown is signalled.
    ///
    /// Cancellation is cooperative: a tick already in flight finishes its
    /// fetch, but once shutdown is observed nothing is written to the cache
    /// and no notifications go out.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.settings.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            interval_secs = self.settings.interval.as_secs(),
            "poller started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => self.tick(&shutdown).await,
                _ = shutdown.changed() => {
                    info!("poller shutting down");
                    break;
                }
            }
        }
    }

    /// Run one polling cycle over all active scopes.
    pub async fn tick(&self, shutdown: &watch::Receiver<bool>) {
        for scope in self.scopes() {
            if *shutdown.borrow() {
                debug!("shutdown requested, abandoning remaining scopes");
                return;
            }
            self.process_scope(scope, shutdown).await;
        }
    }

    /// The scopes this tick must refresh.
    fn scopes(&self) -> Vec<Scope> {
        match self.settings.mode {
            CacheMode::Global => vec![Scope::Global],
            CacheMode::PerSubscriber => self
                .registry
                .list()
                .into_iter()
                .map(Scope::Subscriber)
                .collect(),
        }
    }

    async fn process_scope(&self, scope: Scope, shutdown: &watch::Receiver<bool>) {
        // A manual refresh may have run in between ticks; don't hit the
        // upstream again for a scope that is still within the interval.
        if let Some(cached) = self.cache.get(scope) {
            if cached.is_fresh(self.settings.interval) {
                debug!(scope = %scope, age_secs = cached.age().as_secs(), "cached snapshot still within interval, skipping fetch");
                return;
            }
        }

        let rates = match self.fetch_with_retry().await {
            Ok(rates) => rates,
            Err(error) => {
                warn!(scope = %scope, error = %error, "fetch failed, keeping cached snapshot");
                return;
            }
        };

        if rates.is_empty() {
            warn!(scope = %scope, "fetch returned no rates, keeping cached snapshot");
            return;
        }

        // Cooperative cancellation: a fetch that raced shutdown must not
        // write into the cache or notify.
        if *shutdown.borrow() {
            debug!(scope = %scope, "shutdown requested, discarding fetch result");
            return;
        }

        let snapshot = Snapshot::new(rates, Utc::now());
        let changed = match self.cache.get(scope) {
            Some(previous) => snapshot_changed(&previous, &snapshot),
            None => true,
        };

        if !changed {
            // Steady state: unchanged rates are not stored, so the cached
            // entry's fetched_at is not advanced, and nobody is notified.
            debug!(scope = %scope, "rates unchanged");
            return;
        }

        if !self.cache.store(scope, snapshot.clone()) {
            warn!(scope = %scope, "stale fetch result lost the write race, not notifying");
            return;
        }

        let failures = self.router.notify(scope, &snapshot).await;
        info!(
            scope = %scope,
            rates = snapshot.len(),
            failed_deliveries = failures.len(),
            "rate change notified"
        );
    }

    /// Fetch once, with a single delayed retry after an upstream rate limit.
    async fn fetch_with_retry(&self) -> Result<Vec<Rate>, FetchError> {
        match self.source.fetch().await {
            Err(error) if error.is_retryable() => {
                warn!(
                    delay_secs = self.settings.rate_limit_retry.as_secs(),
                    "rate limited by upstream, retrying once after delay"
                );
                tokio::time::sleep(self.settings.rate_limit_retry).await;
                self.source.fetch().await
            }
            result => result,
        }
    }
}
