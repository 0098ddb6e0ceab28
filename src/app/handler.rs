//! Transport-agnostic command handling.
//!
//! The Telegram adapter (or any other command surface) calls into
//! [`CommandContext`]; everything here is testable without a bot token.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::cache::RateCache;
use crate::config::CacheMode;
use crate::domain::{Scope, Snapshot, SubscriberId};
use crate::error::FetchError;
use crate::port::RateSource;
use crate::registry::SubscriptionRegistry;

/// Outcome of the on-demand rates path.
#[derive(Debug)]
pub enum RatesReply {
    /// A snapshot that is fresh, or was just fetched.
    Fresh(Snapshot),
    /// The refresh failed but a stale snapshot exists; serve it with a
    /// warning rather than nothing.
    Stale {
        snapshot: Snapshot,
        error: FetchError,
    },
    /// The refresh failed and nothing is cached for this scope.
    Failed(FetchError),
}

/// Shared state behind the command surface.
pub struct CommandContext {
    cache: Arc<RateCache>,
    registry: Arc<SubscriptionRegistry>,
    source: Arc<dyn RateSource>,
    ttl: Duration,
    mode: CacheMode,
}

impl CommandContext {
    #[must_use]
    pub fn new(
        cache: Arc<RateCache>,
        registry: Arc<SubscriptionRegistry>,
        source: Arc<dyn RateSource>,
        ttl: Duration,
        mode: CacheMode,
    ) -> Self {
        Self {
            cache,
            registry,
            source,
            ttl,
            mode,
        }
    }

    /// The cache scope serving a given subscriber under the configured mode.
    #[must_use]
    pub fn scope_for(&self, id: SubscriberId) -> Scope {
        match self.mode {
            CacheMode::Global => Scope::Global,
            CacheMode::PerSubscriber => Scope::Subscriber(id),
        }
    }

    /// Register the caller as a subscriber. Idempotent.
    pub fn handle_start(&self, id: SubscriberId) {
        if self.registry.add(id) {
            info!(subscriber = %id, subscribers = self.registry.len(), "subscriber registered");
        }
    }

    /// Serve the caller's scope from cache, refreshing when stale.
    ///
    /// On refresh failure the policy is serve-stale-with-warning: an
    /// existing snapshot is returned as [`RatesReply::Stale`], and only an
    /// empty cache produces [`RatesReply::Failed`].
    pub async fn handle_rates(&self, id: SubscriberId) -> RatesReply {
        let scope = self.scope_for(id);
        let source = Arc::clone(&self.source);

        let refreshed = self
            .cache
            .get_or_refresh(scope, self.ttl, move || async move {
                source.fetch().await
            })
            .await;

        match refreshed {
            Ok(snapshot) => RatesReply::Fresh(snapshot),
            Err(error) => match self.cache.get(scope) {
                Some(snapshot) => {
                    warn!(scope = %scope, error = %error, "refresh failed, serving stale snapshot");
                    RatesReply::Stale { snapshot, error }
                }
                None => {
                    warn!(scope = %scope, error = %error, "refresh failed with empty cache");
                    RatesReply::Failed(error)
                }
            },
        }
    }
}
