use bedesign::lookup::{run_lookups, LookupOutcome, LookupSet, LookupTimeouts};
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::fakes::{FailingRegistry, FakeLiterature, FakeRegistry, FakeVendor, HangingLiterature};

fn full_set(delay: Duration) -> LookupSet {
    LookupSet::new()
        .with_literature(FakeLiterature::reporting_cv(32.0).with_delay(delay))
        .with_registry(FakeRegistry { delay })
        .with_vendor(FakeVendor { delay })
}

#[tokio::test(start_paused = true)]
async fn all_sources_complete() {
    let results = run_lookups(
        &full_set(Duration::from_secs(1)),
        "metformin",
        &CancellationToken::new(),
    )
    .await;

    assert!(results.literature.is_completed());
    assert!(results.registry.is_completed());
    assert!(results.vendor.is_completed());
    assert_eq!(results.extracted_cv(), Some(32.0));

    let registry = results.registry.completed().unwrap();
    assert_eq!(registry.count, 1);
    assert_eq!(registry.registered_drugs[0].name, "metformin 500 mg");
    assert_eq!(
        results.vendor.completed().unwrap().half_life.as_deref(),
        Some("6 h")
    );
}

#[tokio::test(start_paused = true)]
async fn unconfigured_sources_are_skipped() {
    let set = LookupSet::new().with_vendor(FakeVendor {
        delay: Duration::ZERO,
    });
    let results = run_lookups(&set, "aspirin", &CancellationToken::new()).await;

    assert_eq!(results.literature, LookupOutcome::Skipped);
    assert_eq!(results.registry, LookupOutcome::Skipped);
    assert!(results.vendor.is_completed());
    assert_eq!(results.extracted_cv(), None);
}

#[tokio::test(start_paused = true)]
async fn slow_literature_times_out_without_blocking_others() {
    let set = LookupSet::new()
        .with_literature(FakeLiterature::reporting_cv(32.0).with_delay(Duration::from_secs(30)))
        .with_registry(FakeRegistry {
            delay: Duration::from_secs(2),
        })
        .with_vendor(FakeVendor {
            delay: Duration::from_secs(2),
        });

    let start = Instant::now();
    let results = run_lookups(&set, "metformin", &CancellationToken::new()).await;
    let elapsed = start.elapsed();

    assert_eq!(results.literature, LookupOutcome::Timeout);
    assert!(results.registry.is_completed());
    assert!(results.vendor.is_completed());
    assert_eq!(results.extracted_cv(), None);
    assert!(elapsed >= Duration::from_secs(20));
    assert!(elapsed < Duration::from_secs(21));
}

#[tokio::test(start_paused = true)]
async fn custom_timeouts_apply_per_source() {
    let timeouts = LookupTimeouts {
        literature: Duration::from_secs(5),
        registry: Duration::from_secs(1),
        vendor: Duration::from_secs(5),
    };
    let set = full_set(Duration::from_secs(3)).with_timeouts(timeouts);
    let results = run_lookups(&set, "metformin", &CancellationToken::new()).await;

    assert!(results.literature.is_completed());
    assert_eq!(results.registry, LookupOutcome::Timeout);
    assert!(results.vendor.is_completed());
}

#[tokio::test(start_paused = true)]
async fn timed_out_lookup_is_torn_down() {
    let (literature, dropped) = HangingLiterature::tracked();
    let set = LookupSet::new().with_literature(literature);

    let results = run_lookups(&set, "metformin", &CancellationToken::new()).await;
    assert_eq!(results.literature, LookupOutcome::Timeout);

    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    assert!(dropped.load(Ordering::SeqCst));
}

#[tokio::test(start_paused = true)]
async fn failure_becomes_error_outcome() {
    let set = LookupSet::new()
        .with_literature(FakeLiterature::reporting_cv(32.0))
        .with_registry(FailingRegistry);
    let results = run_lookups(&set, "metformin", &CancellationToken::new()).await;

    assert!(results.literature.is_completed());
    match &results.registry {
        LookupOutcome::Failed(message) => assert!(message.contains("registry down")),
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(results.registry.status(), "error");
}

#[tokio::test(start_paused = true)]
async fn parent_token_cancels_everything_in_flight() {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        trigger.cancel();
    });

    let start = Instant::now();
    let results = run_lookups(&full_set(Duration::from_secs(10)), "metformin", &cancel).await;

    assert_eq!(results.literature, LookupOutcome::Cancelled);
    assert_eq!(results.registry, LookupOutcome::Cancelled);
    assert_eq!(results.vendor, LookupOutcome::Cancelled);
    assert!(start.elapsed() < Duration::from_secs(10));
}

#[tokio::test(start_paused = true)]
async fn worker_limit_queues_without_timing_out() {
    let delay = Duration::from_secs(2);

    let start = Instant::now();
    let results = run_lookups(
        &full_set(delay).with_workers(1),
        "metformin",
        &CancellationToken::new(),
    )
    .await;
    assert!(results.literature.is_completed());
    assert!(results.registry.is_completed());
    assert!(results.vendor.is_completed());
    assert!(start.elapsed() >= Duration::from_secs(6));

    let start = Instant::now();
    run_lookups(&full_set(delay), "metformin", &CancellationToken::new()).await;
    assert!(start.elapsed() < Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn deadline_starts_once_a_worker_is_free() {
    let set = LookupSet::new()
        .with_literature(FakeLiterature::reporting_cv(32.0).with_delay(Duration::from_secs(30)))
        .with_registry(FakeRegistry {
            delay: Duration::from_secs(2),
        })
        .with_workers(1);

    let results = run_lookups(&set, "metformin", &CancellationToken::new()).await;

    assert_eq!(results.literature, LookupOutcome::Timeout);
    assert!(results.registry.is_completed());
}

#[tokio::test(start_paused = true)]
async fn dropping_the_fanout_tears_down_lookups() {
    let (literature, dropped) = HangingLiterature::tracked();
    let set = LookupSet::new().with_literature(literature);
    let cancel = CancellationToken::new();

    let abandoned = tokio::time::timeout(
        Duration::from_secs(1),
        run_lookups(&set, "metformin", &cancel),
    )
    .await;
    assert!(abandoned.is_err());

    tokio::time::sleep(Duration::from_secs(120)).await;
    assert!(dropped.load(Ordering::SeqCst));
}
