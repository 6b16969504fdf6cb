//! Contract tests for the in-process backend through the public facade.

use cache_store::{
    BackendKind, Cache, CacheConfig, Metrics, RankingStore, ScoreEntry, ScoreUpdate, parse_limit,
};
use fake::Fake;
use fake::faker::lorem::en::Sentence;
use std::sync::Arc;
use std::time::Duration;
use tokio_test::assert_ok;

const TTL: Duration = Duration::from_secs(30);

#[tokio::test(start_paused = true)]
async fn set_then_get_returns_value() {
    let cache = Cache::in_process(TTL);
    cache.set("k", "v", TTL).await;
    assert_eq!(cache.get("k").await.as_deref(), Some("v"));
}

#[tokio::test(start_paused = true)]
async fn expired_keys_read_as_missing_without_a_sweep() {
    let cache = Cache::in_process(TTL);
    cache.set("k", "v", Duration::from_secs(3)).await;

    tokio::time::advance(Duration::from_millis(2999)).await;
    assert_eq!(cache.get("k").await.as_deref(), Some("v"));

    tokio::time::advance(Duration::from_millis(1)).await;
    assert_eq!(cache.get("k").await, None);
}

#[tokio::test(start_paused = true)]
async fn sweeper_reclaims_expired_entries() {
    let metrics = Arc::new(Metrics::new());
    let config = CacheConfig {
        sweep_interval: Duration::from_secs(1),
        ..CacheConfig::default()
    };
    let (cache, sweeper) = assert_ok!(Cache::from_config(&config, metrics).await);
    let cache_store::CacheBackend::InProcess(store) = cache.backend().clone() else {
        panic!("default config selects the in-process backend");
    };

    cache.set("gone", "1", Duration::from_millis(100)).await;
    cache.set("kept", "2", TTL).await;
    tokio::time::sleep(Duration::from_millis(1500)).await;

    assert_eq!(store.len(), 1);
    assert_eq!(cache.get("kept").await.as_deref(), Some("2"));

    sweeper.expect("sweeper is running").shutdown().await;
}

#[tokio::test]
async fn delete_hides_key_and_is_idempotent() {
    let cache = Cache::in_process(TTL);
    cache.set("k", "v", TTL).await;

    cache.delete("k").await;
    assert_eq!(cache.get("k").await, None);

    cache.delete("k").await;
    cache.delete("never-set").await;
    assert_eq!(cache.get("never-set").await, None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_writers_on_distinct_keys() {
    let cache = Cache::in_process(TTL);
    let writers = 100;

    let mut expected = Vec::with_capacity(writers);
    let mut handles = Vec::with_capacity(writers);
    for i in 0..writers {
        let key = format!("session:{i}");
        let value: String = Sentence(3..8).fake();
        expected.push((key.clone(), value.clone()));

        let cache = cache.clone();
        handles.push(tokio::spawn(async move {
            cache.set(&key, &value, TTL).await;
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    for (key, value) in expected {
        assert_eq!(cache.get(&key).await, Some(value));
    }
}

#[tokio::test]
async fn metrics_summary_after_tracked_requests() {
    let metrics = Arc::new(Metrics::for_backend(BackendKind::InProcess));
    let cache = Cache::in_process(TTL).with_metrics(metrics.clone());
    cache.set("hot", "1", TTL).await;

    for (key, latency_ms) in [("hot", 100), ("hot", 200), ("cold", 300)] {
        let _ = cache.get(key).await;
        metrics.record_request(Duration::from_millis(latency_ms));
    }

    let summary = metrics.summarize();
    assert_eq!(summary.total_requests, 3);
    assert_eq!(summary.cache_hits, 2);
    assert_eq!(summary.cache_misses, 1);
    assert!((summary.avg_latency - 0.2).abs() < 1e-9);
    assert!(summary.p50_latency <= summary.p95_latency);
    assert!(summary.p95_latency <= summary.p99_latency);

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["total_requests"], 3);
    assert_eq!(json["backend"], "in_process");
}

#[tokio::test]
async fn ranking_top_n_through_the_cache_backend() {
    let cache = Cache::in_process(TTL);
    let ranking: RankingStore = cache.ranking("leaderboard");

    for (id, score) in [("a", 10.0), ("b", 30.0), ("c", 20.0)] {
        assert_eq!(assert_ok!(ranking.record(id, score).await), ScoreUpdate::Changed);
    }
    assert_eq!(
        assert_ok!(ranking.record("a", 10.0).await),
        ScoreUpdate::Unchanged
    );

    let top2 = assert_ok!(ranking.top_n(2).await);
    assert_eq!(top2, vec![ScoreEntry::new("b", 30.0), ScoreEntry::new("c", 20.0)]);

    let n = assert_ok!(parse_limit(None));
    let all = assert_ok!(ranking.top_n(n).await);
    assert_eq!(all.len(), 3);
    assert_eq!(all.last().map(|e| e.identifier.as_str()), Some("a"));
}
