//! Client for a Tavily-style web search and content extraction API.
//!
//! The pipeline uses two endpoints: `/extract` for pulling readable content
//! out of a product listing URL, and `/search` for evidence gathering
//! (alternative listings, claim verification, price trends).

mod client;
mod types;

pub use client::TavilyClient;
pub use types::{
    ExtractRequest, ExtractResponse, ExtractResult, SearchDepth, SearchRequest, SearchResponse,
    SearchResult,
};
