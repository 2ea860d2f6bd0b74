//! Redis driver tests against a live server.
//!
//! Run with `STASH_TEST_REDIS_URL=redis://127.0.0.1:6379 cargo test -- --ignored`.

use std::time::Duration;

use filetime::{FileTime, set_file_mtime};
use stash::cache::{
    Cache, CacheBackend, CacheConfig, CacheOptions, RedisCacheConfig, WriteOutcome, create_cache,
};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;

// FLUSHALL in one test would wipe keys written by another.
static SERIAL: Mutex<()> = Mutex::const_new(());

async fn redis_cache(prefix: &str) -> Cache {
    let url = std::env::var("STASH_TEST_REDIS_URL")
        .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
    let config = CacheConfig {
        backend: CacheBackend::Redis,
        prefix: Some(prefix.to_string()),
        redis: RedisCacheConfig {
            url,
            key_prefix: "stash-test".to_string(),
            ..RedisCacheConfig::default()
        },
        ..CacheConfig::default()
    };
    create_cache(&config).await.expect("redis should be reachable")
}

#[tokio::test]
#[ignore = "requires a redis server"]
async fn test_write_read_delete() {
    let _serial = SERIAL.lock().await;
    let cache = redis_cache("rw").await;

    let outcome = cache.add("greeting", "hello", CacheOptions::new()).await.unwrap();
    assert_eq!(outcome, WriteOutcome::Stored);
    assert_eq!(
        cache.get::<String>("greeting").await.unwrap(),
        Some("hello".to_string())
    );

    assert!(cache.remove("greeting").await.unwrap());
    assert_eq!(cache.get::<String>("greeting").await.unwrap(), None);
    assert!(!cache.remove("greeting").await.unwrap());
}

#[tokio::test]
#[ignore = "requires a redis server"]
async fn test_clear_requires_all_flag() {
    let _serial = SERIAL.lock().await;
    let cache = redis_cache("clear").await;

    cache.add("a", &1, CacheOptions::new()).await.unwrap();
    assert!(!cache.clean(&CacheOptions::new()).await.unwrap());
    assert_eq!(cache.get::<i32>("a").await.unwrap(), Some(1));

    assert!(cache.clean(&CacheOptions::all()).await.unwrap());
    assert_eq!(cache.get::<i32>("a").await.unwrap(), None);
}

#[tokio::test]
#[ignore = "requires a redis server"]
async fn test_expiration() {
    let _serial = SERIAL.lock().await;
    let cache = redis_cache("expire").await;

    cache
        .add("short", "lived", CacheOptions::new().expire("2 seconds"))
        .await
        .unwrap();
    assert!(cache.get::<String>("short").await.unwrap().is_some());

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(cache.get::<String>("short").await.unwrap(), None);
}

#[tokio::test]
#[ignore = "requires a redis server"]
async fn test_non_positive_expiration_deletes() {
    let _serial = SERIAL.lock().await;
    let cache = redis_cache("evict").await;

    cache.add("key", "value", CacheOptions::new()).await.unwrap();
    let outcome = cache
        .add("key", "value", CacheOptions::new().expire(-1_i64))
        .await
        .unwrap();
    assert_eq!(outcome, WriteOutcome::Evicted);
    assert_eq!(cache.get::<String>("key").await.unwrap(), None);
}

#[tokio::test]
#[ignore = "requires a redis server"]
async fn test_sliding_expiration() {
    let _serial = SERIAL.lock().await;
    let cache = redis_cache("sliding").await;

    cache
        .add("session", "data", CacheOptions::new().expire("3 seconds").sliding())
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(cache.get::<String>("session").await.unwrap().is_some());

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(cache.get::<String>("session").await.unwrap().is_some());

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(cache.get::<String>("session").await.unwrap(), None);
}

#[tokio::test]
#[ignore = "requires a redis server"]
async fn test_watched_file_change_invalidates() {
    let _serial = SERIAL.lock().await;
    let cache = redis_cache("files").await;
    let file = NamedTempFile::new().unwrap();
    set_file_mtime(file.path(), FileTime::from_unix_time(1_600_000_000, 0)).unwrap();

    cache
        .add("parsed", &vec![1, 2, 3], CacheOptions::new().watch_file(file.path()))
        .await
        .unwrap();
    assert_eq!(
        cache.get::<Vec<i32>>("parsed").await.unwrap(),
        Some(vec![1, 2, 3])
    );

    set_file_mtime(file.path(), FileTime::from_unix_time(1_700_000_000, 0)).unwrap();
    assert_eq!(cache.get::<Vec<i32>>("parsed").await.unwrap(), None);
}
