use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::{LangCacheConfig, RequestConfig};
use crate::error::{CacheError, CacheResult};

/// Client for a LangCache-style semantic cache service.
///
/// Lookups are similarity searches over natural-language prompts rather
/// than exact key matches; the service returns candidates ranked by
/// similarity.
#[derive(Clone)]
pub struct LangCacheClient {
    client: Client,
    base_url: String,
    api_key: String,
    cache_id: String,
}

/// Request body for a similarity search
#[derive(Debug, Clone, Serialize)]
pub struct CacheSearchRequest {
    pub prompt: String,
    #[serde(rename = "similarityThreshold")]
    pub similarity_threshold: f64,
}

/// Response body from a similarity search
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheSearchResponse {
    #[serde(default)]
    pub data: Vec<CacheCandidate>,
}

/// One ranked cache candidate
#[derive(Debug, Clone, Deserialize)]
pub struct CacheCandidate {
    pub response: String,
    #[serde(default)]
    pub similarity: Option<f64>,
}

/// Request body for storing an entry
#[derive(Debug, Clone, Serialize)]
struct CacheSetRequest<'a> {
    prompt: &'a str,
    response: &'a str,
}

impl LangCacheClient {
    /// Create a new semantic cache client
    pub fn new(config: &LangCacheConfig, request_config: &RequestConfig) -> CacheResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(request_config.timeout_ms))
            .build()
            .map_err(CacheError::Http)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            cache_id: config.cache_id.clone(),
        })
    }

    /// Similarity-search the cache, returning candidates ranked by the service
    pub async fn search(&self, prompt: &str, threshold: f64) -> CacheResult<Vec<CacheCandidate>> {
        let url = format!(
            "{}/v1/caches/{}/entries/search",
            self.base_url, self.cache_id
        );

        debug!(prompt = %prompt, threshold, "Semantic cache search");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&CacheSearchRequest {
                prompt: prompt.to_string(),
                similarity_threshold: threshold,
            })
            .send()
            .await
            .map_err(CacheError::Http)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CacheError::Backend {
                message: format!("search returned {}: {}", status.as_u16(), body),
            });
        }

        let search_response: CacheSearchResponse =
            response.json().await.map_err(|e| CacheError::Malformed {
                message: format!("Failed to parse cache search response: {}", e),
            })?;

        Ok(search_response.data)
    }

    /// Store a prompt/response pair
    pub async fn set(&self, prompt: &str, response: &str) -> CacheResult<()> {
        let url = format!("{}/v1/caches/{}/entries", self.base_url, self.cache_id);

        let http_response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&CacheSetRequest { prompt, response })
            .send()
            .await
            .map_err(CacheError::Http)?;

        let status = http_response.status();
        if !status.is_success() {
            let body = http_response.text().await.unwrap_or_default();
            return Err(CacheError::Backend {
                message: format!("set returned {}: {}", status.as_u16(), body),
            });
        }

        Ok(())
    }

    /// Get the base URL (for testing)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
