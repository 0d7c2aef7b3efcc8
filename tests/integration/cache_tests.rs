//! Cache integration tests.
//!
//! Tests verify:
//! - Repeated requests are served from disk without touching storage
//! - Half-batch eviction keeps the cache within its bound
//! - Cached variants survive a restart
//! - Cache write failures do not fail the request

use tempfile::TempDir;

use resize_streamer::{CacheStore, DescriptorResolver, ResizeService};

use super::test_utils::{build_service, create_test_png, test_catalog, MockObjectStore, BUCKET};

#[tokio::test]
async fn test_repeated_requests_fetch_once() {
    let dir = TempDir::new().unwrap();
    let store =
        MockObjectStore::new().with_object(BUCKET, "user/42", create_test_png(64, 64, [5, 5, 5]));
    let service = build_service(store.clone(), dir.path(), 10).await;

    for i in 0..5 {
        let response = service.serve("images/avatar/user/42/large.jpg").await.unwrap();
        assert_eq!(response.cache_hit, i > 0);
    }

    assert_eq!(store.fetch_count(), 1);

    let stats = service.cache_stats().await;
    assert_eq!(stats.entries, 1);
    assert_eq!(stats.hits, 4);
    assert_eq!(stats.misses, 1);
}

#[tokio::test]
async fn test_eviction_keeps_recent_variants() {
    let dir = TempDir::new().unwrap();
    let mut store = MockObjectStore::new();
    for i in 0..5 {
        store = store.with_object(BUCKET, &format!("obj{}", i), create_test_png(8, 8, [1, 2, 3]));
    }
    let service = build_service(store.clone(), dir.path(), 4).await;

    for i in 0..4 {
        service
            .serve(&format!("images/avatar/obj{}/large.png", i))
            .await
            .unwrap();
    }
    assert_eq!(service.cache().len().await, 4);

    // Refresh obj0 and obj1 so obj2 and obj3 become the oldest.
    for i in 0..2 {
        let response = service
            .serve(&format!("images/avatar/obj{}/large.png", i))
            .await
            .unwrap();
        assert!(response.cache_hit);
    }

    service.serve("images/avatar/obj4/large.png").await.unwrap();

    let stats = service.cache_stats().await;
    assert_eq!(stats.entries, 3);
    assert_eq!(stats.evictions, 2);
    assert_eq!(store.fetch_count(), 5);

    for i in [0, 1, 4] {
        let response = service
            .serve(&format!("images/avatar/obj{}/large.png", i))
            .await
            .unwrap();
        assert!(response.cache_hit, "obj{} should still be cached", i);
    }

    let response = service.serve("images/avatar/obj2/large.png").await.unwrap();
    assert!(!response.cache_hit, "obj2 should have been evicted");
    assert_eq!(store.fetch_count(), 6);
}

#[tokio::test]
async fn test_cache_survives_restart() {
    let dir = TempDir::new().unwrap();
    let store =
        MockObjectStore::new().with_object(BUCKET, "user/42", create_test_png(64, 64, [5, 5, 5]));

    let first = {
        let service = build_service(store, dir.path(), 10).await;
        service.serve("images/avatar/user/42/large.jpg").await.unwrap()
    };
    assert!(!first.cache_hit);

    // The original is gone from storage; only the disk cache can answer.
    let empty = MockObjectStore::new();
    let service = build_service(empty.clone(), dir.path(), 10).await;
    let second = service.serve("images/avatar/user/42/large.jpg").await.unwrap();

    assert!(second.cache_hit);
    assert_eq!(second.data, first.data);
    assert_eq!(empty.fetch_count(), 0);
}

#[tokio::test]
async fn test_cache_write_failure_still_serves() {
    let dir = TempDir::new().unwrap();
    let cache_dir = dir.path().join("cache");
    let store =
        MockObjectStore::new().with_object(BUCKET, "user/42", create_test_png(16, 16, [5, 5, 5]));

    let cache = CacheStore::open(&cache_dir, 10).await.unwrap();
    let resolver = DescriptorResolver::new(std::sync::Arc::new(test_catalog()));
    let service = ResizeService::new(resolver, store.clone(), cache);

    std::fs::remove_dir_all(&cache_dir).unwrap();

    let response = service.serve("images/avatar/user/42/large.jpg").await.unwrap();
    assert!(!response.cache_hit);
    assert!(!response.data.is_empty());
    assert_eq!(service.cache().len().await, 0);

    let response = service.serve("images/avatar/user/42/large.jpg").await.unwrap();
    assert!(!response.cache_hit);
    assert_eq!(store.fetch_count(), 2);
}

#[tokio::test]
async fn test_clear_cache() {
    let dir = TempDir::new().unwrap();
    let store =
        MockObjectStore::new().with_object(BUCKET, "user/42", create_test_png(16, 16, [5, 5, 5]));
    let service = build_service(store.clone(), dir.path(), 10).await;

    service.serve("images/avatar/user/42/large.jpg").await.unwrap();
    service.clear_cache().await;
    assert!(service.cache().is_empty().await);

    let response = service.serve("images/avatar/user/42/large.jpg").await.unwrap();
    assert!(!response.cache_hit);
    assert_eq!(store.fetch_count(), 2);
}
