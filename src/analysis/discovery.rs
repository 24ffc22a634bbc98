use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::retrieval::parse_dollar_amount;
use super::types::{Alternative, AlternativeKind};
use crate::cache::{CacheLayer, CacheValidate};
use crate::tavily::{SearchDepth, SearchRequest, SearchResult, TavilyClient};

/// Marketplaces searched for alternative listings
const MARKETPLACE_DOMAINS: [&str; 7] = [
    "ebay.com",
    "facebook.com/marketplace",
    "craigslist.org",
    "offerup.com",
    "mercari.com",
    "poshmark.com",
    "amazon.com",
];

/// The four fixed sub-query term sets, in discovery order
const SUB_QUERY_TERMS: [&str; 4] = [
    "used pre-owned secondhand cheaper price buy sell",
    "refurbished renewed open box cheaper price discount",
    "cheaper alternative similar product same function lower price budget",
    "generic alternative off brand cheaper price same use",
];

/// Maximum alternatives returned per discovery run
const MAX_ALTERNATIVES: usize = 8;

/// Cached payload for one alternative sub-query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedSearch {
    pub query: String,
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

// An empty result list is a legitimate cacheable outcome
impl CacheValidate for CachedSearch {}

/// Discovers cheaper/used/refurbished/generic equivalents of a product.
///
/// Four marketplace searches feed a shared post-processing pass: dedup by
/// URL, keep only genuine product pages, require product-name relevance,
/// classify, extract prices, cap at eight.
pub struct AlternativeFinder {
    tavily: Option<TavilyClient>,
    cache: Arc<CacheLayer>,
    strip_amazon_dash: Regex,
    strip_pipe_tail: Regex,
    strip_amazon_tail: Regex,
    strip_buy_prefix: Regex,
    product_path: Regex,
    bare_domain: Regex,
    price: Regex,
}

impl AlternativeFinder {
    /// Create a finder; `tavily = None` makes discovery a no-op
    pub fn new(tavily: Option<TavilyClient>, cache: Arc<CacheLayer>) -> Self {
        Self {
            tavily,
            cache,
            strip_amazon_dash: Regex::new(r"(?i)\s*-\s*Amazon.*$")
                .expect("name pattern is a valid regex"),
            strip_pipe_tail: Regex::new(r"\s*\|.*$").expect("name pattern is a valid regex"),
            strip_amazon_tail: Regex::new(r"(?i)Amazon.*$").expect("name pattern is a valid regex"),
            strip_buy_prefix: Regex::new(r"(?i)^Buy\s+").expect("name pattern is a valid regex"),
            product_path: Regex::new(
                r"(?i)/(dp|gp/product|product|products|itm|p|item|items|marketplace/item|listing|offer|warehouse-deals|outlet|gp/offer-listing)/[^/]+",
            )
            .expect("path pattern is a valid regex"),
            bare_domain: Regex::new(r"^https?://[^/]+/?$").expect("domain pattern is a valid regex"),
            price: Regex::new(r"\$[\d,]+\.?\d*").expect("price pattern is a valid regex"),
        }
    }

    /// Strip vendor-site suffixes from a product name before searching
    pub fn clean_product_name(&self, name: &str) -> String {
        let cleaned = self.strip_amazon_dash.replace(name, "");
        let cleaned = self.strip_pipe_tail.replace(&cleaned, "");
        let cleaned = self.strip_amazon_tail.replace(&cleaned, "");
        let cleaned = self.strip_buy_prefix.replace(&cleaned, "");
        cleaned.trim().to_string()
    }

    /// Run the four sub-queries and post-process the combined results
    pub async fn discover(
        &self,
        product_name: &str,
        current_price: Option<f64>,
    ) -> Vec<Alternative> {
        let tavily = match &self.tavily {
            Some(client) => client,
            None => return Vec::new(),
        };

        let clean_name = self.clean_product_name(product_name);
        if clean_name.len() < 3 {
            return Vec::new();
        }

        let mut raw_results = Vec::new();
        for terms in SUB_QUERY_TERMS {
            raw_results.extend(self.search_sub_query(tavily, &clean_name, terms).await);
        }

        let alternatives = self.post_process(&clean_name, current_price, raw_results);

        if alternatives.is_empty() {
            warn!(product = %clean_name, "No valid product pages found after filtering");
        } else {
            info!(
                product = %clean_name,
                count = alternatives.len(),
                "Alternatives discovered"
            );
        }

        alternatives
    }

    async fn search_sub_query(
        &self,
        tavily: &TavilyClient,
        clean_name: &str,
        terms: &str,
    ) -> Vec<SearchResult> {
        let query = format!("{} {}", clean_name, terms);
        let prompt = format!("Search alternatives: {}", query);
        let threshold = self.cache.config().alternatives_threshold;

        if let Some(hit) = self.cache.get::<CachedSearch>(&prompt, &prompt, threshold).await {
            debug!(query = %query, "Alternatives search cache hit");
            return hit.results;
        }

        let request = SearchRequest::new(format!("{} product page buy now", query))
            .with_depth(SearchDepth::Advanced)
            .with_max_results(20)
            .with_domains(MARKETPLACE_DOMAINS.iter().map(|d| d.to_string()).collect());

        match tavily.search(request).await {
            Ok(response) => {
                let payload = CachedSearch {
                    query,
                    results: response.results,
                };
                self.cache.put(&prompt, &prompt, &payload).await;
                payload.results
            }
            Err(e) => {
                // A failed sub-query contributes nothing; the others still run
                warn!(query = %query, error = %e, "Alternatives search failed");
                Vec::new()
            }
        }
    }

    fn post_process(
        &self,
        clean_name: &str,
        current_price: Option<f64>,
        raw_results: Vec<SearchResult>,
    ) -> Vec<Alternative> {
        let mut seen_urls: HashSet<String> = HashSet::new();
        let mut alternatives = Vec::new();

        let name_lower = clean_name.to_lowercase();
        let keywords: Vec<&str> = name_lower
            .split_whitespace()
            .filter(|w| w.len() > 3)
            .collect();

        for result in raw_results {
            if result.url.is_empty() || seen_urls.contains(&result.url) {
                continue;
            }

            if !self.is_product_page(&result.url) {
                debug!(url = %result.url, "Excluding non-product page");
                continue;
            }

            let title_lower = result.title.to_lowercase();
            let content_lower = result.content.to_lowercase();
            let url_lower = result.url.to_lowercase();

            // Relevance gate; skipped entirely when the product name has
            // no keyword longer than three characters.
            if !keywords.is_empty() {
                let relevant = keywords.iter().any(|k| {
                    title_lower.contains(k) || content_lower.contains(k) || url_lower.contains(k)
                });
                if !relevant {
                    continue;
                }
            }

            seen_urls.insert(result.url.clone());

            let kind = classify(&title_lower, &content_lower, &url_lower);

            let price_text = format!("{} {}", result.title, result.content);
            let price = self
                .price
                .find(&price_text)
                .and_then(|m| parse_dollar_amount(m.as_str()));

            let savings = match (current_price, price) {
                (Some(current), Some(alt)) => Some(current - alt),
                _ => None,
            };

            alternatives.push(Alternative {
                kind,
                description: if result.title.is_empty() {
                    "Alternative option".to_string()
                } else {
                    result.title.clone()
                },
                url: Some(result.url),
                price,
                savings,
            });

            if alternatives.len() >= MAX_ALTERNATIVES {
                break;
            }
        }

        alternatives
    }

    /// True when a URL looks like a direct product listing rather than a
    /// search, category, or home page
    pub fn is_product_page(&self, url: &str) -> bool {
        let lower = url.to_lowercase();

        // Search pages
        if lower.contains("/search")
            || lower.contains("/s?")
            || lower.contains("?q=")
            || lower.contains("&q=")
            || lower.contains("query=")
            || lower.contains("search=")
            || lower.contains("/s/")
        {
            return false;
        }

        // Category and browse pages
        if lower.contains("/category/")
            || lower.contains("/browse/")
            || lower.contains("/shop/")
            || lower.contains("/c/")
            || lower.contains("/department/")
            || lower.contains("/list/")
            || lower.contains("/collections/")
        {
            return false;
        }

        // Home and generic pages
        if self.bare_domain.is_match(&lower)
            || (lower.ends_with('/') && lower.split('/').count() <= 4)
            || lower.contains("/home")
            || lower.contains("/index")
        {
            return false;
        }

        self.product_path.is_match(url)
    }
}

fn classify(title: &str, content: &str, url: &str) -> AlternativeKind {
    let used_in_title = ["used", "pre-owned", "secondhand"]
        .iter()
        .any(|t| title.contains(t));
    let used_in_content = ["used", "pre-owned"].iter().any(|t| content.contains(t));
    let used_in_url = ["used", "warehouse"].iter().any(|t| url.contains(t));

    if used_in_title || used_in_content || used_in_url {
        return AlternativeKind::Used;
    }

    let refurb_in_title = ["refurbished", "renewed", "open box"]
        .iter()
        .any(|t| title.contains(t));
    let refurb_in_content = ["refurbished", "renewed"].iter().any(|t| content.contains(t));

    if refurb_in_title || refurb_in_content {
        // Refurbished counts as used
        return AlternativeKind::Used;
    }

    AlternativeKind::Alternative
}
