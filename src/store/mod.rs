//! Durable per-user key-value store.
//!
//! The third cache tier: session state, historical analyses, browsing
//! history, preferences, and price alerts, all keyed by constructed
//! strings scoped to a user. Never used for content-scoped analysis
//! dedup. The trait mirrors the Redis-shaped contract the pipeline
//! depends on (`get/set/expire/list_push/list_range/list_trim/set_add`);
//! the shipped implementation is SQLite.

mod sqlite;

pub use sqlite::SqliteStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::StoreResult;

/// Key construction helpers shared by the agent and the CLI
pub mod keys {
    /// Session state for a user
    pub fn session(user_id: &str) -> String {
        format!("session:{}", user_id)
    }

    /// A single stored analysis, timestamped
    pub fn analysis(user_id: &str, timestamp_ms: i64) -> String {
        format!("analysis:{}:{}", user_id, timestamp_ms)
    }

    /// Browsing-history list (most-recent-first analysis keys)
    pub fn history(user_id: &str) -> String {
        format!("user:{}:history", user_id)
    }

    /// User preferences blob
    pub fn preferences(user_id: &str) -> String {
        format!("user:{}:preferences", user_id)
    }

    /// Alert list for a product
    pub fn alert(product_id: &str) -> String {
        format!("alert:{}", product_id)
    }

    /// Set of alert keys a user has created
    pub fn user_alerts(user_id: &str) -> String {
        format!("user:{}:alerts", user_id)
    }
}

/// Per-user session state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSession {
    pub user_id: String,
    /// Creation time, unix milliseconds
    pub created_at: i64,
    /// Last activity time, unix milliseconds
    pub last_active: i64,
    /// Number of products analyzed in this session
    pub product_count: u64,
}

impl UserSession {
    /// Create a fresh session for a user
    pub fn new(user_id: impl Into<String>) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            user_id: user_id.into(),
            created_at: now,
            last_active: now,
            product_count: 0,
        }
    }
}

/// A price alert registered by a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceAlert {
    pub user_id: String,
    pub product_id: String,
    pub threshold: f64,
    /// Creation time, unix milliseconds
    pub created_at: i64,
    pub triggered: bool,
}

/// Redis-shaped durable store contract
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Get a value, treating expired keys as absent
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Set a value with an optional time-to-live
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> StoreResult<()>;

    /// Update the time-to-live of an existing key
    async fn expire(&self, key: &str, ttl: Duration) -> StoreResult<()>;

    /// Push a value to the front of a list
    async fn list_push(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Read a front-first range of a list; `stop = -1` means "to the end"
    async fn list_range(&self, key: &str, start: i64, stop: i64) -> StoreResult<Vec<String>>;

    /// Trim a list to the front-first range `[start, stop]`
    async fn list_trim(&self, key: &str, start: i64, stop: i64) -> StoreResult<()>;

    /// Add a member to a set (idempotent)
    async fn set_add(&self, key: &str, member: &str) -> StoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_construction() {
        assert_eq!(keys::session("u1"), "session:u1");
        assert_eq!(keys::analysis("u1", 1700000000000), "analysis:u1:1700000000000");
        assert_eq!(keys::history("u1"), "user:u1:history");
        assert_eq!(keys::preferences("u1"), "user:u1:preferences");
        assert_eq!(keys::alert("p1"), "alert:p1");
        assert_eq!(keys::user_alerts("u1"), "user:u1:alerts");
    }

    #[test]
    fn test_new_session_starts_empty() {
        let session = UserSession::new("u1");
        assert_eq!(session.user_id, "u1");
        assert_eq!(session.product_count, 0);
        assert_eq!(session.created_at, session.last_active);
    }
}
