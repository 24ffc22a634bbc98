use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::types::ProductInfo;
use crate::cache::{CacheLayer, CacheValidate};
use crate::config::RequestConfig;
use crate::error::{TavilyError, TavilyResult};
use crate::tavily::TavilyClient;

/// Extracted page content, the cacheable unit of this stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlResult {
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// True when served from cache
    #[serde(default)]
    pub cached: bool,
}

impl CacheValidate for CrawlResult {
    fn is_valid(&self) -> bool {
        !self.content.is_empty() || !self.title.is_empty()
    }
}

/// Fetches and extracts readable content from a listing URL.
///
/// Primary path: the extraction service, retried with linear backoff.
/// Fallback path: a direct fetch of the page with a `<title>` scrape,
/// which yields a degraded result (no content, no price).
pub struct ContentRetriever {
    tavily: Option<TavilyClient>,
    cache: Arc<CacheLayer>,
    request_config: RequestConfig,
    fallback_client: Client,
    title_tag: Regex,
    generic_name: Regex,
    price: Regex,
    brand: Regex,
}

impl ContentRetriever {
    /// Create a retriever; `tavily = None` leaves only the fallback path
    pub fn new(
        tavily: Option<TavilyClient>,
        cache: Arc<CacheLayer>,
        request_config: RequestConfig,
    ) -> TavilyResult<Self> {
        let fallback_client = Client::builder()
            .timeout(Duration::from_millis(request_config.timeout_ms))
            .build()
            .map_err(TavilyError::Http)?;

        Ok(Self {
            tavily,
            cache,
            request_config,
            fallback_client,
            title_tag: Regex::new(r"(?i)<title[^>]*>([^<]+)</title>")
                .expect("title pattern is a valid regex"),
            generic_name: Regex::new(r"(?i)(?:product|title|name)[:\s]+([^.\n]+)")
                .expect("name pattern is a valid regex"),
            price: Regex::new(r"\$[\d,]+\.?\d*").expect("price pattern is a valid regex"),
            brand: Regex::new(r"(?i)(?:brand|made by|manufacturer)[:\s]+([A-Z][a-zA-Z\s]+)")
                .expect("brand pattern is a valid regex"),
        })
    }

    fn crawl_prompt(url: &str) -> String {
        format!("Crawl URL content: {}", url)
    }

    /// Retrieve page content for a URL, cache-first.
    ///
    /// Errors only when the extraction service is exhausted and the
    /// fallback fetch also fails; the caller degrades that to a partial
    /// `ProductInfo` rather than aborting.
    pub async fn retrieve(&self, url: &str) -> TavilyResult<CrawlResult> {
        let prompt = Self::crawl_prompt(url);
        let threshold = self.cache.config().crawl_threshold;

        if let Some(mut cached) = self.cache.get::<CrawlResult>(&prompt, &prompt, threshold).await {
            info!(url = %url, "Crawl cache hit");
            cached.cached = true;
            return Ok(cached);
        }

        debug!(url = %url, "Crawl cache miss, fetching fresh");

        let mut last_error: Option<TavilyError> = None;

        if let Some(tavily) = &self.tavily {
            for attempt in 1..=self.request_config.max_retries {
                if attempt > 1 {
                    // Linear backoff between attempts
                    let delay =
                        Duration::from_millis(self.request_config.retry_delay_ms * (attempt as u64 - 1));
                    tokio::time::sleep(delay).await;
                }

                match tavily.extract(url).await {
                    Ok(extracted) => {
                        let content = extracted.content.unwrap_or_default();
                        if content.is_empty() {
                            warn!(url = %url, attempt, "Extraction returned empty content");
                            last_error = Some(TavilyError::InvalidResponse {
                                message: "No content returned from extraction".to_string(),
                            });
                            continue;
                        }

                        let result = CrawlResult {
                            url: url.to_string(),
                            title: extracted.title.unwrap_or_else(|| url.to_string()),
                            content,
                            cached: false,
                        };
                        self.cache.put(&prompt, &prompt, &result).await;
                        return Ok(result);
                    }
                    Err(e) => {
                        warn!(url = %url, attempt, error = %e, "Extraction attempt failed");
                        last_error = Some(e);
                    }
                }
            }
        } else {
            last_error = Some(TavilyError::NotConfigured);
        }

        match self.fetch_title_fallback(url).await {
            Ok(result) => {
                info!(url = %url, "Falling back to direct title scrape");
                // Degraded fallback results are cached the same as full
                // results. Known policy choice, kept as specified.
                self.cache.put(&prompt, &prompt, &result).await;
                Ok(result)
            }
            Err(fallback_error) => {
                warn!(url = %url, error = %fallback_error, "Fallback fetch failed");
                Err(TavilyError::ExtractionFailed {
                    url: url.to_string(),
                    attempts: self.request_config.max_retries,
                    message: last_error
                        .map(|e| e.to_string())
                        .unwrap_or_else(|| fallback_error.to_string()),
                })
            }
        }
    }

    async fn fetch_title_fallback(&self, url: &str) -> TavilyResult<CrawlResult> {
        let response = self
            .fallback_client
            .get(url)
            .send()
            .await
            .map_err(TavilyError::Http)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TavilyError::Api {
                status: status.as_u16(),
                message: format!("Fallback fetch of {} failed", url),
            });
        }

        let html = response.text().await.map_err(TavilyError::Http)?;
        let title = self
            .title_tag
            .captures(&html)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .ok_or_else(|| TavilyError::InvalidResponse {
                message: format!("No <title> found at {}", url),
            })?;

        Ok(CrawlResult {
            url: url.to_string(),
            title,
            content: String::new(),
            cached: false,
        })
    }

    /// Build an immutable `ProductInfo` from a crawl result
    pub fn build_product_info(&self, url: &str, crawl: &CrawlResult) -> ProductInfo {
        let mut title = clean_listing_title(&crawl.title);

        // Generic titles get a second chance from the page content
        if title.to_lowercase().contains("amazon") || title == url || title.len() < 5 {
            if let Some(captures) = self.generic_name.captures(&crawl.content) {
                if let Some(name) = captures.get(1) {
                    let name = name.as_str().trim();
                    if !name.is_empty() {
                        title = name.to_string();
                    }
                }
            }
        }

        let description: String = crawl.content.chars().take(2000).collect();

        let price = self
            .price
            .find(&crawl.content)
            .and_then(|m| parse_dollar_amount(m.as_str()));

        let brand = self
            .brand
            .captures(&crawl.content)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string());

        ProductInfo {
            url: url.to_string(),
            title: if title.is_empty() {
                url.to_string()
            } else {
                title
            },
            description,
            currency: price.map(|_| "USD".to_string()),
            price,
            brand,
        }
    }
}

/// Strip vendor-site noise from a listing title
pub fn clean_listing_title(raw: &str) -> String {
    let mut title = raw.trim().to_string();

    for prefix in ["Amazon.com:", "Amazon:"] {
        if let Some(rest) = strip_prefix_ignore_case(&title, prefix) {
            title = rest.trim().to_string();
        }
    }
    if let Some(rest) = strip_prefix_ignore_case(&title, "Buy ") {
        title = rest.trim().to_string();
    }

    // First segment before a | or - separator
    title = title
        .split('|')
        .next()
        .unwrap_or("")
        .split('-')
        .next()
        .unwrap_or("")
        .trim()
        .to_string();

    title
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    if text.len() >= prefix.len() && text[..prefix.len()].eq_ignore_ascii_case(prefix) {
        Some(&text[prefix.len()..])
    } else {
        None
    }
}

/// Parse a `$1,234.56`-style match into a number
pub fn parse_dollar_amount(matched: &str) -> Option<f64> {
    matched.replace(['$', ','], "").parse().ok()
}
