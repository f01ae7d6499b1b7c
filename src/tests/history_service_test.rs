// History reader tests: namespace enumeration and partial-result tolerance

use std::sync::Arc;
use std::time::Duration;

use crate::models::ErrorRecord;
use crate::services::HistoryService;
use crate::services::cache::CacheStore;
use crate::tests::common::{TEST_PREFIX, UnreachableCache, memory_cache};

const HOUR: Duration = Duration::from_secs(3600);

async fn store(cache: &dyn CacheStore, record: &ErrorRecord) {
    let key = ErrorRecord::cache_key(TEST_PREFIX, &record.error);
    cache.set_ex(&key, &record.to_json().unwrap(), HOUR).await.unwrap();
}

/// Test: one corrupt entry out of N is skipped, the rest are returned
#[tokio::test]
async fn test_corrupt_entry_is_skipped() {
    let cache = memory_cache();
    store(cache.as_ref(), &ErrorRecord::new("OOM", "add memory")).await;
    store(cache.as_ref(), &ErrorRecord::new("Timeout", "raise timeout")).await;
    cache.set_ex("error:broken", "not json at all", HOUR).await.unwrap();
    // valid JSON, wrong shape
    cache.set_ex("error:partial", r#"{"error":"partial"}"#, HOUR).await.unwrap();

    let history = HistoryService::new(cache, TEST_PREFIX).list_history().await;

    let mut errors: Vec<_> = history.iter().map(|r| r.error.as_str()).collect();
    errors.sort();
    assert_eq!(errors, vec!["OOM", "Timeout"]);
}

/// Test: keys outside the error namespace are ignored
#[tokio::test]
async fn test_only_error_namespace_is_listed() {
    let cache = memory_cache();
    store(cache.as_ref(), &ErrorRecord::new("OOM", "add memory")).await;
    cache
        .set_ex("session:abc", &ErrorRecord::new("other", "x").to_json().unwrap(), HOUR)
        .await
        .unwrap();

    let history = HistoryService::new(cache, TEST_PREFIX).list_history().await;

    assert_eq!(history.len(), 1);
    assert_eq!(history[0].error, "OOM");
}

/// Test: records are returned exactly as stored
#[tokio::test]
async fn test_records_round_trip_unchanged() {
    let cache = memory_cache();
    let record = ErrorRecord::new("segfault in worker", "update the driver");
    store(cache.as_ref(), &record).await;

    let history = HistoryService::new(cache, TEST_PREFIX).list_history().await;

    assert_eq!(history, vec![record]);
}

/// Test: entries whose timestamp carries no UTC offset are listed
#[tokio::test]
async fn test_timestamp_without_offset_is_listed() {
    let cache = memory_cache();
    let raw = r#"{"error":"OOM","solution":"add memory","timestamp":"2024-05-01T12:00:00.123456"}"#;
    cache.set_ex("error:OOM", raw, HOUR).await.unwrap();

    let history = HistoryService::new(cache, TEST_PREFIX).list_history().await;

    assert_eq!(history.len(), 1);
    assert_eq!(history[0].error, "OOM");
    assert_eq!(
        history[0].timestamp,
        "2024-05-01T12:00:00.123456Z".parse::<chrono::DateTime<chrono::Utc>>().unwrap()
    );
}

/// Test: a failed scan yields an empty list instead of an error
#[tokio::test]
async fn test_unreachable_store_yields_empty_history() {
    let history = HistoryService::new(Arc::new(UnreachableCache), TEST_PREFIX)
        .list_history()
        .await;
    assert!(history.is_empty());
}
