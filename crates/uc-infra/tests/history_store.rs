use chrono::{Duration, Utc};
use tempfile::TempDir;
use uc_core::clipboard::{ClipboardContent, ContentType, ListOpts};
use uc_core::device::DeviceId;
use uc_core::ports::history_store::{HistoryStorePort, PutOutcome};
use uc_infra::{init_db_pool, PooledExecutor, SqliteHistoryStore};

fn store(dir: &TempDir, max_size: u64) -> SqliteHistoryStore<PooledExecutor> {
    store_with_floor(dir, max_size, 0)
}

fn store_with_floor(dir: &TempDir, max_size: u64, keep_items: usize) -> SqliteHistoryStore<PooledExecutor> {
    let db_path = dir.path().join("clipman.db");
    let pool = init_db_pool(db_path.to_str().unwrap()).unwrap();
    SqliteHistoryStore::new(PooledExecutor::new(pool), max_size, keep_items)
}

fn content(bytes: &[u8], offset_secs: i64, device: DeviceId) -> ClipboardContent {
    ClipboardContent::new(
        bytes.to_vec(),
        ContentType::Text,
        Utc::now() + Duration::seconds(offset_secs),
        device,
    )
}

#[tokio::test]
async fn put_then_get_round_trips() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir, 1024 * 1024);
    let device = DeviceId::new();
    let c = content(b"hello", 0, device);
    let hash = c.hash;

    assert_eq!(store.put(c.clone()).await.unwrap(), PutOutcome::Inserted);
    let fetched = store.get(&hash).await.unwrap().unwrap();
    assert_eq!(fetched.data, b"hello");
}

#[tokio::test]
async fn duplicate_put_bumps_created_without_new_row() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir, 1024 * 1024);
    let device = DeviceId::new();
    let first = content(b"same", 0, device);
    let second = content(b"same", 60, device);

    assert_eq!(store.put(first).await.unwrap(), PutOutcome::Inserted);
    assert_eq!(store.put(second).await.unwrap(), PutOutcome::Duplicate);

    let stats = store.list(ListOpts::default()).await.unwrap();
    assert_eq!(stats.len(), 1);
}

#[tokio::test]
async fn delete_then_get_returns_none() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir, 1024 * 1024);
    let device = DeviceId::new();
    let c = content(b"gone", 0, device);
    let hash = c.hash;

    store.put(c).await.unwrap();
    assert!(store.delete(&hash).await.unwrap());
    assert!(store.get(&hash).await.unwrap().is_none());
}

#[tokio::test]
async fn put_driven_eviction_keeps_cache_within_bound_or_floor_count() {
    // No explicit `flush` call here: `put` is the only eviction trigger the
    // monitor ever exercises, so the bound must hold from `put` alone.
    let dir = TempDir::new().unwrap();
    let store = store_with_floor(&dir, 1024, 2);
    let device = DeviceId::new();

    for i in 0..10 {
        let bytes = vec![b'a'; 200];
        let c = content(&bytes, i, device);
        store.put(c).await.unwrap();
    }

    let size = store.cache_size().await.unwrap();
    let remaining = store.list(ListOpts::default()).await.unwrap();
    assert!(size <= 1024 || remaining.len() <= 2);
}

#[tokio::test]
async fn put_driven_eviction_never_drops_below_keep_items_floor() {
    // max_size is small enough that every `put` past the first would evict
    // everything if the floor weren't honored.
    let dir = TempDir::new().unwrap();
    let store = store_with_floor(&dir, 100, 5);
    let device = DeviceId::new();

    for i in 0..10 {
        let bytes = vec![b'a'; 50];
        let c = content(&bytes, i, device);
        store.put(c).await.unwrap();
    }

    let remaining = store.list(ListOpts::default()).await.unwrap();
    assert_eq!(remaining.len(), 5);
}

#[tokio::test]
async fn list_respects_limit() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir, 1024 * 1024);
    let device = DeviceId::new();
    for i in 0..5 {
        let bytes = format!("item-{i}").into_bytes();
        store.put(content(&bytes, i, device)).await.unwrap();
    }

    let opts = ListOpts {
        limit: Some(2),
        ..Default::default()
    };
    let results = store.list(opts).await.unwrap();
    assert_eq!(results.len(), 2);
}
