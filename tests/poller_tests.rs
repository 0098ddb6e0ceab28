use std::sync::Arc;
use std::time::Duration;

use ratewatch::cache::RateCache;
use ratewatch::config::CacheMode;
use ratewatch::domain::{Scope, Snapshot};
use ratewatch::error::FetchError;
use ratewatch::poller::{Poller, PollerSettings};
use ratewatch::registry::SubscriptionRegistry;
use ratewatch::router::NotificationRouter;
use ratewatch::testkit;
use ratewatch::testkit::sink::RecordingSink;
use ratewatch::testkit::source::ScriptedSource;
use tokio::sync::watch;

struct Fixture {
    cache: Arc<RateCache>,
    registry: Arc<SubscriptionRegistry>,
    source: Arc<ScriptedSource>,
    sink: Arc<RecordingSink>,
    poller: Poller,
}

fn fixture(source: ScriptedSource, sink: RecordingSink, mode: CacheMode) -> Fixture {
    let cache = Arc::new(RateCache::new());
    let registry = Arc::new(SubscriptionRegistry::new());
    let source = Arc::new(source);
    let sink = Arc::new(sink);

    let sink_port: Arc<dyn ratewatch::port::Sink> = sink.clone();
    let source_port: Arc<dyn ratewatch::port::RateSource> = source.clone();

    let router = Arc::new(NotificationRouter::new(
        Arc::clone(&registry),
        sink_port,
        Arc::new(|s: &Snapshot| format!("{} rates", s.len())),
    ));

    let poller = Poller::new(
        Arc::clone(&cache),
        Arc::clone(&registry),
        router,
        source_port,
        PollerSettings {
            interval: Duration::from_secs(900),
            rate_limit_retry: Duration::from_millis(10),
            mode,
        },
    );

    Fixture {
        cache,
        registry,
        source,
        sink,
        poller,
    }
}

fn no_shutdown() -> watch::Receiver<bool> {
    let (_tx, rx) = watch::channel(false);
    rx
}

#[tokio::test]
async fn unchanged_rates_produce_no_notification_and_no_store() {
    let source = ScriptedSource::new().with_results(vec![Ok(vec![
        testkit::domain::usd_uah_rate(),
        testkit::domain::eur_uah_rate(),
    ])]);
    let f = fixture(source, RecordingSink::new(), CacheMode::Global);
    f.registry.add(testkit::domain::subscriber(1));

    // Previous snapshot with identical values, old enough to poll again.
    let previous = testkit::domain::snapshot_aged(
        vec![
            testkit::domain::usd_uah_rate(),
            testkit::domain::eur_uah_rate(),
        ],
        Duration::from_secs(1000),
    );
    f.cache.store(Scope::Global, previous.clone());

    f.poller.tick(&no_shutdown()).await;

    assert_eq!(f.source.fetch_count(), 1);
    assert_eq!(f.sink.delivery_count(), 0);
    // The entry's fetched_at was not advanced.
    assert_eq!(f.cache.get(Scope::Global), Some(previous));
}

#[tokio::test]
async fn changed_rates_are_stored_and_fanned_out() {
    let source = ScriptedSource::new().with_results(vec![Ok(vec![testkit::domain::rate(
        testkit::domain::usd_uah(),
        rust_decimal_macros::dec!(41.0),
        rust_decimal_macros::dec!(41.5),
    )])]);
    let f = fixture(source, RecordingSink::new(), CacheMode::Global);
    f.registry.add(testkit::domain::subscriber(1));
    f.registry.add(testkit::domain::subscriber(2));

    let previous = testkit::domain::snapshot_aged(
        vec![testkit::domain::usd_uah_rate()],
        Duration::from_secs(1000),
    );
    f.cache.store(Scope::Global, previous.clone());

    f.poller.tick(&no_shutdown()).await;

    assert_eq!(f.sink.delivery_count(), 2);
    let stored = f.cache.get(Scope::Global).unwrap();
    assert!(stored.fetched_at > previous.fetched_at);
    assert_eq!(stored.rates[0].buy, rust_decimal_macros::dec!(41.0));
}

#[tokio::test]
async fn first_successful_fetch_notifies() {
    let source =
        ScriptedSource::new().with_results(vec![Ok(vec![testkit::domain::usd_uah_rate()])]);
    let f = fixture(source, RecordingSink::new(), CacheMode::Global);
    f.registry.add(testkit::domain::subscriber(1));

    f.poller.tick(&no_shutdown()).await;

    assert_eq!(f.sink.delivery_count(), 1);
    assert!(f.cache.get(Scope::Global).is_some());
}

#[tokio::test]
async fn fetch_failure_keeps_cache_and_stays_silent() {
    let source =
        ScriptedSource::new().with_results(vec![Err(FetchError::Upstream { status: 500 })]);
    let f = fixture(source, RecordingSink::new(), CacheMode::Global);
    f.registry.add(testkit::domain::subscriber(1));

    let previous = testkit::domain::snapshot_aged(
        vec![testkit::domain::usd_uah_rate()],
        Duration::from_secs(1000),
    );
    f.cache.store(Scope::Global, previous.clone());

    f.poller.tick(&no_shutdown()).await;

    assert_eq!(f.sink.delivery_count(), 0);
    assert_eq!(f.cache.get(Scope::Global), Some(previous));
}

#[tokio::test]
async fn rate_limited_fetch_is_retried_exactly_once() {
    let source = ScriptedSource::new().with_results(vec![
        Err(FetchError::RateLimited),
        Ok(vec![testkit::domain::usd_uah_rate()]),
    ]);
    let f = fixture(source, RecordingSink::new(), CacheMode::Global);
    f.registry.add(testkit::domain::subscriber(1));

    f.poller.tick(&no_shutdown()).await;

    assert_eq!(f.source.fetch_count(), 2);
    assert_eq!(f.sink.delivery_count(), 1);
}

#[tokio::test]
async fn rate_limited_twice_gives_up_for_the_cycle() {
    let source = ScriptedSource::new()
        .with_results(vec![Err(FetchError::RateLimited), Err(FetchError::RateLimited)]);
    let f = fixture(source, RecordingSink::new(), CacheMode::Global);
    f.registry.add(testkit::domain::subscriber(1));

    f.poller.tick(&no_shutdown()).await;

    // One retry only, then wait for the next scheduled tick.
    assert_eq!(f.source.fetch_count(), 2);
    assert_eq!(f.sink.delivery_count(), 0);
    assert!(f.cache.get(Scope::Global).is_none());
}

#[tokio::test]
async fn cached_entry_younger_than_interval_skips_fetch() {
    let source =
        ScriptedSource::new().with_results(vec![Ok(vec![testkit::domain::usd_uah_rate()])]);
    let f = fixture(source, RecordingSink::new(), CacheMode::Global);
    f.registry.add(testkit::domain::subscriber(1));

    // A manual refresh happened moments ago.
    f.cache.store(
        Scope::Global,
        testkit::domain::snapshot(vec![testkit::domain::usd_uah_rate()]),
    );

    f.poller.tick(&no_shutdown()).await;

    assert_eq!(f.source.fetch_count(), 0);
    assert_eq!(f.sink.delivery_count(), 0);
}

#[tokio::test]
async fn empty_fetch_result_is_not_stored() {
    let source = ScriptedSource::new().with_results(vec![Ok(vec![])]);
    let f = fixture(source, RecordingSink::new(), CacheMode::Global);
    f.registry.add(testkit::domain::subscriber(1));

    f.poller.tick(&no_shutdown()).await;

    assert_eq!(f.sink.delivery_count(), 0);
    assert!(f.cache.get(Scope::Global).is_none());
}

#[tokio::test]
async fn per_subscriber_mode_processes_each_subscriber_scope() {
    let source = ScriptedSource::new().with_results(vec![
        Ok(vec![testkit::domain::usd_uah_rate()]),
        Ok(vec![testkit::domain::usd_uah_rate()]),
    ]);
    let f = fixture(source, RecordingSink::new(), CacheMode::PerSubscriber);
    f.registry.add(testkit::domain::subscriber(1));
    f.registry.add(testkit::domain::subscriber(2));

    f.poller.tick(&no_shutdown()).await;

    assert_eq!(f.source.fetch_count(), 2);
    assert_eq!(f.sink.delivery_count(), 2);
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
async fn shutdown_during_fetch_discards_the_result() {
    let source = ScriptedSource::new()
        .with_results(vec![Ok(vec![testkit::domain::usd_uah_rate()])])
        .with_delay(Duration::from_millis(50));
    let f = fixture(source, RecordingSink::new(), CacheMode::Global);
    f.registry.add(testkit::domain::subscriber(1));

    let (tx, rx) = watch::channel(false);

    let tick = {
        let poller = f.poller;
        tokio::spawn(async move { poller.tick(&rx).await })
    };

    // Let the fetch start, then request shutdown while it is in flight.
    tokio::time::sleep(Duration::from_millis(10)).await;
    tx.send(true).unwrap();
    tick.await.unwrap();

    assert_eq!(f.source.fetch_count(), 1);
    assert_eq!(f.sink.delivery_count(), 0);
    assert!(f.cache.get(Scope::Global).is_none());
}
