//! Integration tests for the SQLite-backed durable store.

use std::time::Duration;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use reclaim::config::DatabaseConfig;
use reclaim::store::{DurableStore, SqliteStore};

async fn store() -> SqliteStore {
    SqliteStore::new_in_memory().await.expect("in-memory store")
}

#[tokio::test]
async fn test_get_set_round_trip() {
    let store = store().await;

    assert_eq!(store.get("missing").await.unwrap(), None);

    store.set("k", "v1", None).await.unwrap();
    assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v1"));

    store.set("k", "v2", None).await.unwrap();
    assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v2"));
}

#[tokio::test]
async fn test_expired_key_reads_as_absent() {
    let store = store().await;

    // Zero TTL expires immediately
    store
        .set("ephemeral", "v", Some(Duration::from_secs(0)))
        .await
        .unwrap();
    assert_eq!(store.get("ephemeral").await.unwrap(), None);

    // And a subsequent write revives the key
    store.set("ephemeral", "v2", None).await.unwrap();
    assert_eq!(store.get("ephemeral").await.unwrap().as_deref(), Some("v2"));
}

#[tokio::test]
async fn test_expire_shortens_lifetime() {
    let store = store().await;

    store.set("k", "v", None).await.unwrap();
    store.expire("k", Duration::from_secs(0)).await.unwrap();
    assert_eq!(store.get("k").await.unwrap(), None);
}

#[tokio::test]
async fn test_list_is_front_first() {
    let store = store().await;

    for i in 1..=5 {
        store
            .list_push("history", &format!("entry-{}", i))
            .await
            .unwrap();
    }

    let all = store.list_range("history", 0, -1).await.unwrap();
    assert_eq!(
        all,
        vec!["entry-5", "entry-4", "entry-3", "entry-2", "entry-1"]
    );

    let first_two = store.list_range("history", 0, 1).await.unwrap();
    assert_eq!(first_two, vec!["entry-5", "entry-4"]);
}

#[tokio::test]
async fn test_list_trim_keeps_newest_hundred() {
    let store = store().await;

    for i in 1..=105 {
        store
            .list_push("history", &format!("entry-{}", i))
            .await
            .unwrap();
    }
    store.list_trim("history", 0, 99).await.unwrap();

    let remaining = store.list_range("history", 0, -1).await.unwrap();
    assert_eq!(remaining.len(), 100);
    assert_eq!(remaining[0], "entry-105");
    assert_eq!(remaining[99], "entry-6");
}

#[tokio::test]
async fn test_lists_are_isolated_by_key() {
    let store = store().await;

    store.list_push("a", "1").await.unwrap();
    store.list_push("b", "2").await.unwrap();
    store.list_trim("a", 0, -1).await.unwrap();

    assert_eq!(store.list_range("a", 0, -1).await.unwrap(), vec!["1"]);
    assert_eq!(store.list_range("b", 0, -1).await.unwrap(), vec!["2"]);
}

#[tokio::test]
async fn test_set_add_is_idempotent() {
    let store = store().await;

    store.set_add("alerts", "alert:p1").await.unwrap();
    store.set_add("alerts", "alert:p1").await.unwrap();
    store.set_add("alerts", "alert:p2").await.unwrap();

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM kv_set WHERE key = ?")
        .bind("alerts")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(count.0, 2);
}

#[tokio::test]
async fn test_file_backed_store_persists_across_connections() {
    let dir = TempDir::new().unwrap();
    let config = DatabaseConfig {
        path: dir.path().join("reclaim.db"),
        max_connections: 2,
    };

    {
        let store = SqliteStore::new(&config).await.unwrap();
        store.set("k", "persisted", None).await.unwrap();
    }

    let reopened = SqliteStore::new(&config).await.unwrap();
    assert_eq!(
        reopened.get("k").await.unwrap().as_deref(),
        Some("persisted")
    );
}
