use serde::{Deserialize, Serialize};

/// Search depth requested from the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchDepth {
    Basic,
    Advanced,
}

/// Request body for the `/search` endpoint
#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest {
    pub query: String,
    pub search_depth: SearchDepth,
    pub max_results: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_domains: Option<Vec<String>>,
}

impl SearchRequest {
    /// Create a basic search request with default limits
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            search_depth: SearchDepth::Basic,
            max_results: 5,
            include_domains: None,
        }
    }

    /// Set the search depth
    pub fn with_depth(mut self, depth: SearchDepth) -> Self {
        self.search_depth = depth;
        self
    }

    /// Set the maximum number of results
    pub fn with_max_results(mut self, max: u32) -> Self {
        self.max_results = max;
        self
    }

    /// Restrict results to an allow-list of domains
    pub fn with_domains(mut self, domains: Vec<String>) -> Self {
        self.include_domains = Some(domains);
        self
    }
}

/// Response body from the `/search` endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

/// One search hit
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub content: String,
}

/// Request body for the `/extract` endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ExtractRequest {
    pub urls: Vec<String>,
}

impl ExtractRequest {
    /// Extract a single URL
    pub fn single(url: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
        }
    }
}

/// Response body from the `/extract` endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractResponse {
    #[serde(default)]
    pub results: Vec<ExtractResult>,
}

/// Extracted content for one URL
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractResult {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "raw_content")]
    pub content: Option<String>,
}
