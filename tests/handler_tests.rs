use std::sync::Arc;
use std::time::Duration;

use ratewatch::app::handler::{CommandContext, RatesReply};
use ratewatch::cache::RateCache;
use ratewatch::config::CacheMode;
use ratewatch::domain::Scope;
use ratewatch::error::FetchError;
use ratewatch::registry::SubscriptionRegistry;
use ratewatch::testkit;
use ratewatch::testkit::source::ScriptedSource;

const TTL: Duration = Duration::from_secs(900);

struct Fixture {
    cache: Arc<RateCache>,
    registry: Arc<SubscriptionRegistry>,
    source: Arc<ScriptedSource>,
    context: CommandContext,
}

fn fixture(source: ScriptedSource, mode: CacheMode) -> Fixture {
    let cache = Arc::new(RateCache::new());
    let registry = Arc::new(SubscriptionRegistry::new());
    let source = Arc::new(source);

    let source_port: Arc<dyn ratewatch::port::RateSource> = source.clone();
    let context = CommandContext::new(
        Arc::clone(&cache),
        Arc::clone(&registry),
        source_port,
        TTL,
        mode,
    );

    Fixture {
        cache,
        registry,
        source,
        context,
    }
}

#[tokio::test]
async fn start_registers_subscriber_idempotently() {
    let f = fixture(ScriptedSource::new(), CacheMode::Global);
    let id = testkit::domain::subscriber(1);

    f.context.handle_start(id);
    f.context.handle_start(id);

    assert_eq!(f.registry.len(), 1);
    assert!(f.registry.contains(id));
}

#[tokio::test]
async fn rates_fetches_and_caches_on_miss() {
    let f = fixture(
        ScriptedSource::new().with_results(vec![Ok(vec![testkit::domain::usd_uah_rate()])]),
        CacheMode::Global,
    );

    let reply = f.context.handle_rates(testkit::domain::subscriber(1)).await;

    assert!(matches!(reply, RatesReply::Fresh(ref s) if s.len() == 1));
    assert!(f.cache.get(Scope::Global).is_some());
    assert_eq!(f.source.fetch_count(), 1);
}

#[tokio::test]
async fn rates_serves_fresh_cache_without_fetching() {
    let f = fixture(ScriptedSource::new(), CacheMode::Global);
    f.cache.store(
        Scope::Global,
        testkit::domain::snapshot(vec![testkit::domain::usd_uah_rate()]),
    );

    let reply = f.context.handle_rates(testkit::domain::subscriber(1)).await;

    assert!(matches!(reply, RatesReply::Fresh(_)));
    assert_eq!(f.source.fetch_count(), 0);
}

#[tokio::test]
async fn failed_refresh_serves_stale_snapshot_with_warning() {
    let f = fixture(
        ScriptedSource::new().with_results(vec![Err(FetchError::Upstream { status: 503 })]),
        CacheMode::Global,
    );

    let stale = testkit::domain::snapshot_aged(
        vec![testkit::domain::usd_uah_rate()],
        Duration::from_secs(2000),
    );
    f.cache.store(Scope::Global, stale.clone());

    let reply = f.context.handle_rates(testkit::domain::subscriber(1)).await;

    match reply {
        RatesReply::Stale { snapshot, error } => {
            assert_eq!(snapshot, stale);
            assert!(matches!(error, FetchError::Upstream { status: 503 }));
        }
        other => panic!("expected stale reply, got {other:?}"),
    }
}

#[tokio::test]
async fn failed_refresh_with_empty_cache_fails() {
    let f = fixture(
        ScriptedSource::new().with_results(vec![Err(FetchError::Timeout)]),
        CacheMode::Global,
    );

    let reply = f.context.handle_rates(testkit::domain::subscriber(1)).await;

    assert!(matches!(reply, RatesReply::Failed(FetchError::Timeout)));
}

#[tokio::test]
async fn per_subscriber_mode_keeps_separate_freshness_clocks() {
    let f = fixture(
        ScriptedSource::new().with_results(vec![
            Ok(vec![testkit::domain::usd_uah_rate()]),
            Ok(vec![testkit::domain::eur_uah_rate()]),
        ]),
        CacheMode::PerSubscriber,
    );

    f.context.handle_rates(testkit::domain::subscriber(1)).await;
    f.context.handle_rates(testkit::domain::subscriber(2)).await;

    // Each subscriber scope triggered its own fetch.
    assert_eq!(f.source.fetch_count(), 2);
    assert!(f
        .cache
        .get(Scope::Subscriber(testkit::domain::subscriber(1)))
        .is_some());
    assert!(f
        .cache
        .get(Scope::Subscriber(testkit::domain::subscriber(2)))
        .is_some());
}

#[tokio::test]
async fn global_mode_shares_one_scope_across_subscribers() {
    let f = fixture(
        ScriptedSource::new().with_results(vec![Ok(vec![testkit::domain::usd_uah_rate()])]),
        CacheMode::Global,
    );

    f.context.handle_rates(testkit::domain::subscriber(1)).await;
    f.context.handle_rates(testkit::domain::subscriber(2)).await;

    // The second subscriber was served from the shared fresh snapshot.
    assert_eq!(f.source.fetch_count(), 1);
    assert_eq!(f.cache.len(), 1);
}
