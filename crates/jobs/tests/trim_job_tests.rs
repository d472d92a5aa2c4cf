use ferrous_cache_jobs::{JobRunner, StatsJob, TrimJob};
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tokio_util::sync::CancellationToken;

mod helpers;
use helpers::{fill, shared_cache, KIB};

// ============================================================================
// Tests: TrimJob ticks
// ============================================================================

#[tokio::test]
async fn test_run_once_finishes_rescheduled_trim() {
    let (cache, clock) = shared_cache(false);
    fill(&cache, "page", 20, 100 * KIB).await;
    clock.set_tick(Duration::from_millis(5));
    cache.lock().await.create_entry("page-20", 100 * KIB).unwrap();
    assert_eq!(cache.lock().await.pending_tasks(), 1);

    let job = TrimJob::new(cache.clone());
    let ran = job.run_once().await;

    let cache = cache.lock().await;
    assert_eq!(ran, 2);
    assert_eq!(cache.pending_tasks(), 0);
    assert_eq!(cache.entry_count(), 10);
    assert!(cache.total_bytes() <= cache.eviction().target_size());
}

#[tokio::test]
async fn test_run_once_trims_cache_above_maximum() {
    let (cache, _clock) = shared_cache(true);
    fill(&cache, "page", 20, 100 * KIB).await;
    {
        let mut cache = cache.lock().await;
        cache.store_mut().set_loaded(true);
        cache.create_entry("page-20", 100 * KIB).unwrap();
        cache.store_mut().set_loaded(false);
        assert!(cache.total_bytes() > cache.max_size());
    }

    let job = TrimJob::new(cache.clone());
    let ran = job.run_once().await;

    let cache = cache.lock().await;
    assert_eq!(ran, 0);
    assert!(cache.total_bytes() <= cache.eviction().target_size());
}

#[tokio::test]
async fn test_run_once_on_idle_cache_does_nothing() {
    let (cache, _clock) = shared_cache(true);
    fill(&cache, "page", 3, KIB).await;

    let job = TrimJob::new(cache.clone());

    assert_eq!(job.run_once().await, 0);
    assert_eq!(cache.lock().await.metrics().snapshot().trims, 0);
}

// ============================================================================
// Tests: TrimJob lifecycle
// ============================================================================

#[tokio::test]
async fn test_trim_job_drains_tasks_in_background() {
    let (cache, clock) = shared_cache(false);
    fill(&cache, "page", 20, 100 * KIB).await;
    clock.set_tick(Duration::from_millis(5));
    cache.lock().await.create_entry("page-20", 100 * KIB).unwrap();

    let token = CancellationToken::new();
    let job = Arc::new(
        TrimJob::new(cache.clone())
            .with_interval(5)
            .with_cancellation(token.clone()),
    );
    job.start().await;
    sleep(Duration::from_millis(100)).await;
    token.cancel();
    sleep(Duration::from_millis(20)).await;

    let cache = cache.lock().await;
    assert!(cache.total_bytes() <= cache.eviction().target_size());
    assert_eq!(cache.pending_tasks(), 0);
}

#[tokio::test]
async fn test_cancel_stops_eviction() {
    let (cache, _clock) = shared_cache(true);
    let token = CancellationToken::new();
    let job = Arc::new(TrimJob::new(cache.clone()).with_cancellation(token.clone()));

    job.start().await;
    sleep(Duration::from_millis(20)).await;
    token.cancel();
    sleep(Duration::from_millis(20)).await;

    fill(&cache, "page", 25, 100 * KIB).await;
    let cache = cache.lock().await;
    assert!(cache.eviction().is_trimming());
    assert_eq!(cache.entry_count(), 25);
    assert!(cache.total_bytes() > cache.max_size());
}

// ============================================================================
// Tests: StatsJob and JobRunner
// ============================================================================

#[tokio::test]
async fn test_stats_report_reflects_cache() {
    let (cache, _clock) = shared_cache(true);
    fill(&cache, "page", 21, 100 * KIB).await;

    let report = StatsJob::new(cache.clone()).report().await;

    assert_eq!(report.num_entries, 21);
    assert_eq!(report.num_bytes, 1000 * KIB);
    assert!(report.new_eviction);
    assert_eq!(report.lists.sizes, [10, 0, 0, 11]);
    assert_eq!(report.eviction.trims, 1);
    assert_eq!(report.eviction.trimmed_entries, 11);
    assert_eq!(report.pending_tasks, 1);
}

#[tokio::test]
async fn test_runner_starts_registered_jobs() {
    let (cache, clock) = shared_cache(true);
    fill(&cache, "page", 21, 100 * KIB).await;
    assert_eq!(cache.lock().await.pending_tasks(), 1);
    clock.advance(Duration::from_millis(1));

    let token = CancellationToken::new();
    JobRunner::new()
        .with_trim(
            TrimJob::new(cache.clone())
                .with_interval(5)
                .with_cancellation(token.clone()),
        )
        .with_stats(StatsJob::new(cache.clone()).with_cancellation(token.clone()))
        .start()
        .await;
    sleep(Duration::from_millis(50)).await;
    token.cancel();
    sleep(Duration::from_millis(20)).await;

    let cache = cache.lock().await;
    assert_eq!(cache.pending_tasks(), 0);
    assert!(cache.metrics().snapshot().tombstones_removed > 0);
}
