//! Layered cache in front of the expensive pipeline stages.
//!
//! Two tiers are consulted top-down and written bottom-up: an in-process
//! exact-match tier (O(1), TTL-based) and an external semantic tier keyed
//! by natural-language prompts with per-operation similarity thresholds.
//! The durable per-user store is deliberately not part of this layer; it
//! is user-scoped, not content-scoped.
//!
//! Every read and write here is best-effort: a backend failure or a
//! malformed payload is a cache miss, never a pipeline error.

mod memory;
mod semantic;

pub use memory::MemoryCache;
pub use semantic::{CacheCandidate, LangCacheClient};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::CacheConfig;

/// Validity check applied to decoded cache payloads before use.
///
/// Decoding alone is not enough: a payload can parse cleanly and still be
/// semantically empty (for example a crawl result with no title and no
/// content). Such entries are rejected as misses.
pub trait CacheValidate {
    /// True when the decoded payload carries usable data
    fn is_valid(&self) -> bool {
        true
    }
}

/// Outcome of decoding a raw cache payload
enum Decoded<T> {
    Ok(T),
    Empty,
    Malformed,
}

fn decode<T: DeserializeOwned + CacheValidate>(raw: &str) -> Decoded<T> {
    match serde_json::from_str::<T>(raw) {
        Ok(value) if value.is_valid() => Decoded::Ok(value),
        Ok(_) => Decoded::Empty,
        Err(_) => Decoded::Malformed,
    }
}

/// Read-through/write-through orchestrator over the cache tiers
pub struct CacheLayer {
    memory: MemoryCache,
    semantic: Option<LangCacheClient>,
    config: CacheConfig,
}

impl CacheLayer {
    /// Create a cache layer; `semantic` is `None` when the service is
    /// unconfigured, leaving only the exact-match tier active.
    pub fn new(config: CacheConfig, semantic: Option<LangCacheClient>) -> Self {
        Self {
            memory: MemoryCache::new(Duration::from_secs(config.memory_ttl_secs)),
            semantic,
            config,
        }
    }

    /// Cache tuning values (thresholds per operation)
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// True when the semantic tier is configured
    pub fn has_semantic_tier(&self) -> bool {
        self.semantic.is_some()
    }

    /// Read through the tiers: exact match first, then a similarity search.
    ///
    /// A semantic hit backfills the exact tier so repeat lookups for the
    /// same literal key become O(1). Only the top-ranked candidate is
    /// considered, and it must decode to a valid payload.
    pub async fn get<T>(&self, exact_key: &str, prompt: &str, threshold: f64) -> Option<T>
    where
        T: DeserializeOwned + CacheValidate,
    {
        if let Some(raw) = self.memory.get(exact_key) {
            if let Decoded::Ok(value) = decode::<T>(&raw) {
                debug!(key = %exact_key, "Exact-tier cache hit");
                return Some(value);
            }
        }

        let semantic = self.semantic.as_ref()?;
        match semantic.search(prompt, threshold).await {
            Ok(candidates) => {
                let top = candidates.into_iter().next()?;
                match decode::<T>(&top.response) {
                    Decoded::Ok(value) => {
                        debug!(prompt = %prompt, similarity = ?top.similarity, "Semantic-tier cache hit");
                        self.memory.put(exact_key, top.response);
                        Some(value)
                    }
                    Decoded::Empty => {
                        warn!(prompt = %prompt, "Rejecting semantically empty cache entry");
                        None
                    }
                    Decoded::Malformed => {
                        warn!(prompt = %prompt, "Rejecting malformed cache entry");
                        None
                    }
                }
            }
            Err(e) => {
                warn!(prompt = %prompt, error = %e, "Semantic cache search failed, treating as miss");
                None
            }
        }
    }

    /// Write through to every configured tier, best-effort.
    ///
    /// A write failure never fails the computation that produced the value.
    pub async fn put<T: Serialize>(&self, exact_key: &str, prompt: &str, value: &T) {
        let payload = match serde_json::to_string(value) {
            Ok(p) => p,
            Err(e) => {
                warn!(key = %exact_key, error = %e, "Failed to serialize cache payload");
                return;
            }
        };

        self.memory.put(exact_key, payload.clone());

        if let Some(semantic) = &self.semantic {
            if let Err(e) = semantic.set(prompt, &payload).await {
                warn!(prompt = %prompt, error = %e, "Semantic cache write failed");
            }
        }
    }
}
