use std::sync::Arc;
use std::time::Duration;

use redis_metrics_reporter::metrics::{
    GaugeValue, ManualClock, MeterSnapshot, Snapshot, TimerSnapshot,
};
use redis_metrics_reporter::{
    ConfigError, MemoryStore, MetricGroups, PrefixFilter, Registry, Reporter, ReporterConfig,
    Statistic, StoreTarget, TimeUnit,
};

fn reporter_with(
    registry: Arc<Registry>,
    config: ReporterConfig,
) -> (Reporter<MemoryStore>, MemoryStore) {
    let store = MemoryStore::new();
    let reporter = Reporter::new(registry, store.clone(), config).unwrap();
    (reporter, store)
}

#[tokio::test]
async fn writes_every_kind_under_its_suffixes() {
    let clock = Arc::new(ManualClock::new());
    let registry = Arc::new(Registry::with_clock(clock.clone()));

    registry.gauge("app.version", || "2.1.0");
    registry.counter("app.sessions").inc(4);
    let sizes = registry.histogram("app.sizes");
    for v in 1..=10 {
        sizes.update(v);
    }
    registry.meter("app.requests").mark(3);
    registry.timer("app.latency").update(Duration::from_millis(8));
    clock.advance(Duration::from_secs(1));

    let (mut reporter, store) = reporter_with(registry, ReporterConfig::default());
    let summary = reporter.report().await;

    assert_eq!(summary.metrics, 5);
    assert_eq!(summary.failed, 0);
    // gauge 1 + counter 1 + histogram 11 + meter 5 + timer 15
    assert_eq!(summary.written, 33);

    let values = store.values();
    assert_eq!(values["app.version:value"], "2.1.0");
    assert_eq!(values["app.sessions:count"], "4");
    assert_eq!(values["app.sizes:count"], "10");
    assert_eq!(values["app.sizes:min"], "1");
    assert_eq!(values["app.sizes:max"], "10");
    assert_eq!(values["app.sizes:median"], "5.5");
    assert_eq!(values["app.requests:count"], "3");
    assert_eq!(values["app.requests:mean"], "3.0");
    assert_eq!(values["app.latency:count"], "1");
    assert_eq!(values["app.latency:min"], "8.0");
    assert_eq!(values["app.latency:99th-percentile"], "8.0");
    // Duration mean is written after the rate mean.
    assert_eq!(values["app.latency:mean"], "8.0");

    for key in values.keys() {
        assert!(
            Statistic::ALL.iter().any(|s| key.ends_with(s.suffix())),
            "unexpected key {key}"
        );
    }
}

#[tokio::test]
async fn same_snapshot_same_writes() {
    let mut groups = MetricGroups::default();
    groups.gauges.insert("pool.idle".into(), GaugeValue::Int(3));
    groups.counters.insert("jobs.done".into(), 120);
    groups.meters.insert(
        "jobs.rate".into(),
        MeterSnapshot {
            count: 120,
            mean_rate: 2.0,
            one_minute_rate: 1.5,
            five_minute_rate: 1.2,
            fifteen_minute_rate: 1.0,
        },
    );
    groups.timers.insert(
        "jobs.duration".into(),
        TimerSnapshot {
            rates: MeterSnapshot::default(),
            durations: Snapshot::new(vec![1_000_000, 3_000_000, 2_000_000]),
        },
    );

    let (mut reporter, store) = reporter_with(Arc::new(Registry::new()), ReporterConfig::default());

    reporter.report_groups(&groups).await;
    let first = store.writes();
    store.clear();
    reporter.report_groups(&groups).await;
    let second = store.writes();

    assert!(!first.is_empty());
    assert_eq!(first, second);
    assert!(first.contains(&("jobs.rate:mean".to_owned(), "2.0".to_owned())));
    assert!(first.contains(&("jobs.rate:five-minute-average".to_owned(), "1.2".to_owned())));
    assert!(first.contains(&("jobs.duration:median".to_owned(), "2.0".to_owned())));
}

#[tokio::test]
async fn one_failed_key_does_not_block_the_rest() {
    let registry = Arc::new(Registry::new());
    registry.counter("a").inc(1);
    registry.counter("b").inc(2);
    registry.counter("c").inc(3);

    let (mut reporter, store) = reporter_with(registry, ReporterConfig::default());
    store.fail_on("b:count");

    let summary = reporter.report().await;

    assert_eq!(summary.written, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(store.get("a:count").as_deref(), Some("1"));
    assert_eq!(store.get("b:count"), None);
    assert_eq!(store.get("c:count").as_deref(), Some("3"));
}

#[tokio::test]
async fn filtered_metrics_are_not_written() {
    let registry = Arc::new(Registry::new());
    registry.counter("app.hits").inc(1);
    registry.counter("internal.hits").inc(1);
    registry.histogram("internal.sizes").update(5);

    let config = ReporterConfig {
        filter: Arc::new(PrefixFilter::new(["app."])),
        ..ReporterConfig::default()
    };
    let (mut reporter, store) = reporter_with(registry, config);
    reporter.report().await;

    assert_eq!(store.writes(), vec![("app.hits:count".to_owned(), "1".to_owned())]);
}

#[tokio::test]
async fn rates_and_durations_follow_configured_units() {
    let clock = Arc::new(ManualClock::new());
    let registry = Arc::new(Registry::with_clock(clock.clone()));
    let timer = registry.timer("rpc");
    timer.update(Duration::from_millis(1500));
    timer.update(Duration::from_millis(500));
    clock.advance(Duration::from_secs(2));

    let config = ReporterConfig {
        rate_unit: TimeUnit::Minutes,
        duration_unit: TimeUnit::Seconds,
        ..ReporterConfig::default()
    };
    let (mut reporter, store) = reporter_with(registry, config);
    reporter.report().await;

    // Two events over two seconds: one per second, sixty per minute.
    let mean_rate = store
        .writes()
        .into_iter()
        .find(|(key, _)| key == "rpc:mean")
        .map(|(_, value)| value);
    assert_eq!(mean_rate.as_deref(), Some("60.0"));

    assert_eq!(store.get("rpc:min").as_deref(), Some("0.5"));
    assert_eq!(store.get("rpc:max").as_deref(), Some("1.5"));
    assert_eq!(store.get("rpc:mean").as_deref(), Some("1.0"));
}

#[tokio::test(start_paused = true)]
async fn scheduled_reporter_runs_once_per_period() {
    let registry = Arc::new(Registry::new());
    registry.counter("ticks").inc(1);

    let config = ReporterConfig {
        report_on_stop: false,
        ..ReporterConfig::default()
    };
    let (reporter, store) = reporter_with(registry.clone(), config);
    let handle = reporter.start(Duration::from_secs(10));

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(store.writes().is_empty());

    tokio::time::sleep(Duration::from_secs(20)).await;
    assert_eq!(store.writes().len(), 2);

    let reporter = handle.stop().await.unwrap();
    assert_eq!(reporter.store().writes().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn stopping_runs_a_final_cycle() {
    let registry = Arc::new(Registry::new());
    let counter = registry.counter("shutdowns");

    let (reporter, store) = reporter_with(registry, ReporterConfig::default());
    let handle = reporter.start(Duration::from_secs(60));

    counter.inc(1);
    handle.stop().await.unwrap();

    assert_eq!(
        store.writes(),
        vec![("shutdowns:count".to_owned(), "1".to_owned())]
    );
}

#[tokio::test]
async fn bad_store_target_never_writes() {
    let registry = Arc::new(Registry::new());
    registry.counter("orphan").inc(1);

    let config = ReporterConfig {
        store: StoreTarget::new("", 0),
        ..ReporterConfig::default()
    };
    let store = MemoryStore::new();
    let result = Reporter::new(registry, store.clone(), config);

    assert!(matches!(result, Err(ConfigError::InvalidTarget { .. })));
    assert!(store.writes().is_empty());
}
