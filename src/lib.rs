//! # Reclaim
//!
//! A purchase-recommendation pipeline for product listing pages. Give it
//! a URL and it extracts the listing, flags manipulative marketing
//! tactics, cross-checks the claims against web search evidence, hunts
//! for cheaper alternatives across marketplaces, and produces a
//! deterministic 0-100 score with a buy/wait/avoid/find-alternative
//! verdict.
//!
//! ## Architecture
//!
//! ```text
//! CLI → ReclaimAgent → Tavily (search/extract, HTTP)
//!            ↓
//!     CacheLayer (in-process exact + LangCache semantic)
//!            ↓
//!     SQLite (per-user sessions, history, preferences, alerts)
//! ```
//!
//! Every external dependency is optional and injected: without search
//! credentials the pipeline degrades to detection-only analysis, without
//! the semantic cache only the in-process tier runs, and without the
//! store nothing is persisted.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use reclaim::{CacheLayer, Config, ReclaimAgent, SqliteStore, TavilyClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let tavily = config
//!         .tavily
//!         .as_ref()
//!         .map(|c| TavilyClient::new(c, config.request.clone()))
//!         .transpose()?;
//!     let cache = Arc::new(CacheLayer::new(config.cache.clone(), None));
//!     let store = SqliteStore::new(&config.database).await?;
//!     let agent = ReclaimAgent::new(tavily, cache, Some(Arc::new(store)), config.request)?;
//!     let analysis = agent.analyze_product("https://example.com/dp/B0XYZ", None).await?;
//!     println!("{}", analysis.recommendation.verdict);
//!     Ok(())
//! }
//! ```

/// Pipeline stages, data model, and the orchestrating agent.
pub mod analysis;
/// Layered caching: in-process exact tier plus semantic tier.
pub mod cache;
/// Configuration loaded from environment variables.
pub mod config;
/// Error types and result aliases.
pub mod error;
/// Background job registry with TTL cleanup.
pub mod jobs;
/// Durable per-user key-value store backed by SQLite.
pub mod store;
/// Tavily search and extraction client.
pub mod tavily;

pub use analysis::{ProductAnalysis, ReclaimAgent, UserPreferences, Verdict};
pub use cache::{CacheLayer, LangCacheClient};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use store::SqliteStore;
pub use tavily::TavilyClient;
