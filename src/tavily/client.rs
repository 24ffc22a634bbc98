use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use super::types::{ExtractRequest, ExtractResponse, ExtractResult, SearchRequest, SearchResponse};
use crate::config::{RequestConfig, TavilyConfig};
use crate::error::{TavilyError, TavilyResult};

/// Client for the web search / content extraction API
#[derive(Clone)]
pub struct TavilyClient {
    client: Client,
    base_url: String,
    api_key: String,
    request_config: RequestConfig,
}

impl TavilyClient {
    /// Create a new search client
    pub fn new(config: &TavilyConfig, request_config: RequestConfig) -> TavilyResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(request_config.timeout_ms))
            .build()
            .map_err(TavilyError::Http)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            request_config,
        })
    }

    /// Run a web search
    pub async fn search(&self, request: SearchRequest) -> TavilyResult<SearchResponse> {
        let url = format!("{}/search", self.base_url);
        let start = Instant::now();

        debug!(query = %request.query, max_results = request.max_results, "Searching");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(TavilyError::Api {
                status: status.as_u16(),
                message: error_body,
            });
        }

        let search_response: SearchResponse =
            response
                .json()
                .await
                .map_err(|e| TavilyError::InvalidResponse {
                    message: format!("Failed to parse search response: {}", e),
                })?;

        info!(
            query = %request.query,
            results = search_response.results.len(),
            latency_ms = start.elapsed().as_millis(),
            "Search completed"
        );

        Ok(search_response)
    }

    /// Extract readable content from a single URL.
    ///
    /// Performs one attempt; the retrieval stage owns the retry policy.
    pub async fn extract(&self, url: &str) -> TavilyResult<ExtractResult> {
        let endpoint = format!("{}/extract", self.base_url);

        debug!(url = %url, "Extracting content");

        let response = self
            .client
            .post(&endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&ExtractRequest::single(url))
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(TavilyError::Api {
                status: status.as_u16(),
                message: error_body,
            });
        }

        let extract_response: ExtractResponse =
            response
                .json()
                .await
                .map_err(|e| TavilyError::InvalidResponse {
                    message: format!("Failed to parse extract response: {}", e),
                })?;

        extract_response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| TavilyError::InvalidResponse {
                message: format!("No extraction result returned for {}", url),
            })
    }

    fn map_send_error(&self, e: reqwest::Error) -> TavilyError {
        if e.is_timeout() {
            TavilyError::Timeout {
                timeout_ms: self.request_config.timeout_ms,
            }
        } else {
            TavilyError::Http(e)
        }
    }

    /// Get the base URL (for testing)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let config = TavilyConfig {
            api_key: "test_key".to_string(),
            base_url: "https://api.tavily.com/".to_string(),
        };

        let client = TavilyClient::new(&config, RequestConfig::default()).unwrap();
        assert_eq!(client.base_url(), "https://api.tavily.com");
    }
}
