use super::*;
use crate::cycle::INDEX_DELAY;
use crate::fake::FakeCapabilities;
use crate::stop::POLL_INTERVAL;
use serde_json::json;

fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}

fn config(base: u64, min: u64, backoff: u64, max_cycles: u32) -> MintConfig {
    MintConfig {
        tick: "CLAW".to_string(),
        amount: "100".to_string(),
        base_interval: secs(base),
        min_interval: secs(min),
        error_backoff: secs(backoff),
        max_cycles,
        ..MintConfig::default()
    }
}

fn server_error() -> mint_core::PublishResponse {
    FakeCapabilities::status(503, json!({"error": "unavailable"}))
}

#[tokio::test(start_paused = true)]
async fn test_max_cycles_counts_every_outcome() {
    let caps = FakeCapabilities::new();
    caps.push_publish(FakeCapabilities::created("a"))
        .push_publish(server_error())
        .push_publish(FakeCapabilities::rate_limited(Some(1.0)));

    let summary = run_loop(&caps, &config(60, 30, 45, 3), &StopSignal::new()).await;
    assert_eq!(caps.publish_count(), 3);
    assert_eq!(
        summary,
        RunSummary {
            cycles: 3,
            successes: 1,
            rate_limited: 1,
            failures: 1,
            intervals: vec![secs(60), secs(45), secs(60)],
        }
    );
}

#[tokio::test(start_paused = true)]
async fn test_consecutive_errors_double_the_wait() {
    let caps = FakeCapabilities::new();
    for _ in 0..4 {
        caps.push_publish(server_error());
    }
    let start = Instant::now();
    let summary = run_loop(&caps, &config(2100, 60, 125, 4), &StopSignal::new()).await;
    assert_eq!(
        summary.intervals,
        vec![secs(125), secs(250), secs(500), secs(1000)]
    );
    // Initial wait plus the three waits between cycles; none after the last.
    assert_eq!(start.elapsed(), secs(2100 + 125 + 250 + 500));
}

#[tokio::test(start_paused = true)]
async fn test_success_resets_backoff() {
    let caps = FakeCapabilities::new();
    caps.push_publish(server_error())
        .push_publish(server_error())
        .push_publish(FakeCapabilities::created("ok"));
    let summary = run_loop(&caps, &config(35 * 60, 10 * 60, 125, 3), &StopSignal::new()).await;
    assert_eq!(
        summary.intervals,
        vec![secs(600), secs(600), secs(35 * 60)]
    );
}

#[tokio::test(start_paused = true)]
async fn test_rate_limit_does_not_grow_backoff() {
    let caps = FakeCapabilities::new();
    caps.push_publish(server_error())
        .push_publish(FakeCapabilities::rate_limited(Some(10.0)))
        .push_publish(FakeCapabilities::rate_limited(None))
        .push_publish(server_error());
    let summary = run_loop(&caps, &config(2100, 60, 125, 4), &StopSignal::new()).await;
    assert_eq!(
        summary.intervals,
        vec![secs(125), secs(600), secs(1800), secs(250)]
    );
    assert_eq!(summary.rate_limited, 2);
    assert_eq!(summary.failures, 2);
}

#[tokio::test(start_paused = true)]
async fn test_index_failure_keeps_base_interval() {
    let caps = FakeCapabilities::new();
    caps.push_publish(FakeCapabilities::created("a"))
        .push_publish(FakeCapabilities::created("b"))
        .push_index(Err("indexer down".to_string()));
    let summary = run_loop(&caps, &config(900, 60, 125, 2), &StopSignal::new()).await;
    assert_eq!(summary.successes, 2);
    assert_eq!(summary.intervals, vec![secs(900), secs(900)]);
}

#[tokio::test(start_paused = true)]
async fn test_stop_during_initial_wait() {
    let caps = FakeCapabilities::new();
    let stop = StopSignal::new();
    let raiser = stop.clone();
    tokio::spawn(async move {
        tokio::time::sleep(secs(100)).await;
        raiser.raise();
    });

    let start = Instant::now();
    let summary = run_loop(&caps, &config(3600, 60, 125, 0), &stop).await;
    assert_eq!(summary.cycles, 0);
    assert_eq!(caps.publish_count(), 0);
    assert!(start.elapsed() <= secs(100) + POLL_INTERVAL);
}

#[tokio::test(start_paused = true)]
async fn test_stop_during_interval_wait() {
    let caps = FakeCapabilities::new();
    let stop = StopSignal::new();
    let raiser = stop.clone();
    let raise_at = secs(3600) + INDEX_DELAY + secs(500);
    tokio::spawn(async move {
        tokio::time::sleep(raise_at).await;
        raiser.raise();
    });

    let start = Instant::now();
    let summary = run_loop(&caps, &config(3600, 60, 125, 0), &stop).await;
    assert_eq!(summary.cycles, 1);
    assert_eq!(summary.successes, 1);
    let elapsed = start.elapsed();
    assert!(elapsed >= raise_at);
    assert!(elapsed <= raise_at + POLL_INTERVAL);
}

#[tokio::test(start_paused = true)]
async fn test_stop_raised_before_start() {
    let caps = FakeCapabilities::new();
    let stop = StopSignal::new();
    stop.raise();
    let summary = run_loop(&caps, &config(60, 60, 60, 0), &stop).await;
    assert_eq!(summary, RunSummary::default());
}
