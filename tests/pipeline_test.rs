//! End-to-end pipeline tests over mocked search and extraction services.

use std::sync::Arc;

use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use reclaim::analysis::{AlternativeKind, AnalysisStatus, Verdict};
use reclaim::cache::CacheLayer;
use reclaim::config::{CacheConfig, RequestConfig, TavilyConfig};
use reclaim::store::SqliteStore;
use reclaim::tavily::TavilyClient;
use reclaim::ReclaimAgent;

fn fast_request_config() -> RequestConfig {
    RequestConfig {
        timeout_ms: 5000,
        max_retries: 3,
        retry_delay_ms: 1,
    }
}

fn tavily_for(server: &MockServer) -> TavilyClient {
    let config = TavilyConfig {
        api_key: "test-key".to_string(),
        base_url: server.uri(),
    };
    TavilyClient::new(&config, fast_request_config()).expect("client creation")
}

async fn agent_for(server: &MockServer, store: Option<SqliteStore>) -> ReclaimAgent {
    let cache = Arc::new(CacheLayer::new(CacheConfig::default(), None));
    ReclaimAgent::new(
        Some(tavily_for(server)),
        cache,
        store.map(|s| Arc::new(s) as _),
        fast_request_config(),
    )
    .expect("agent construction")
}

/// Any search not matched by a more specific mock returns no results
async fn mount_empty_search_fallback(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"results": []})))
        .with_priority(10)
        .mount(server)
        .await;
}

async fn mount_manipulative_listing(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/extract"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [{
                "url": "https://shop.example.com/dp/SW3000",
                "title": "Amazon.com: SuperWidget Pro 3000 | Best Deals",
                "raw_content": "Limited time offer! Buy now and save. Great widget for your home. Brand: Acme. Priced at $199.99 today."
            }]
        })))
        .expect(1)
        .mount(server)
        .await;

    // Used-marketplace sub-query yields one valid product page
    Mock::given(method("POST"))
        .and(path("/search"))
        .and(body_string_contains("used pre-owned secondhand"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [{
                "title": "Used SuperWidget Pro 3000 in great condition $99.99",
                "url": "https://www.ebay.com/itm/12345",
                "content": "Lightly used SuperWidget, works perfectly"
            }]
        })))
        .expect(1)
        .mount(server)
        .await;

    // Claim verification finds debunking evidence
    Mock::given(method("POST"))
        .and(path("/search"))
        .and(body_string_contains("verify check"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [{
                "title": "These countdown offers are misleading",
                "url": "https://news.example.com/a/1",
                "content": "Investigation found such claims are misleading and often fake"
            }]
        })))
        .expect(2)
        .mount(server)
        .await;

    mount_empty_search_fallback(server).await;
}

#[tokio::test]
async fn test_manipulative_listing_is_flagged_and_scored_down() {
    let server = MockServer::start().await;
    mount_manipulative_listing(&server).await;

    let agent = agent_for(&server, None).await;
    let analysis = agent
        .analyze_product("https://shop.example.com/dp/SW3000", None)
        .await
        .unwrap();

    assert_eq!(analysis.title, "SuperWidget Pro 3000");
    assert_eq!(analysis.price, Some(199.99));
    assert_eq!(analysis.brand.as_deref(), Some("Acme"));
    assert_eq!(analysis.metadata.status, AnalysisStatus::Completed);
    assert!(analysis.metadata.search_used);

    // Urgency and impulse phrases, both debunked by search evidence
    assert_eq!(analysis.manipulation_claims.len(), 2);
    assert!(analysis
        .manipulation_claims
        .iter()
        .all(|c| c.verified == Some(false)));

    assert_eq!(analysis.alternatives.len(), 1);
    let alt = &analysis.alternatives[0];
    assert_eq!(alt.kind, AlternativeKind::Used);
    assert_eq!(alt.price, Some(99.99));
    assert!((alt.savings.unwrap() - 100.0).abs() < 1e-9);

    // Two debunked claims plus a half-price alternative push the score
    // below the avoid threshold
    assert!(analysis.recommendation.score < 30.0);
    assert_eq!(analysis.recommendation.verdict, Verdict::Avoid);
    assert!(analysis
        .recommendation
        .detailed_reasoning
        .contains("MARKETING CLAIMS DETECTED"));
}

#[tokio::test]
async fn test_repeat_analysis_is_served_from_cache() {
    let server = MockServer::start().await;
    // The expect(1) counts on extract and the sub-query mock enforce that
    // the second run makes no further HTTP calls
    mount_manipulative_listing(&server).await;

    let agent = agent_for(&server, None).await;

    let first = agent
        .analyze_product("https://shop.example.com/dp/SW3000", None)
        .await
        .unwrap();
    assert_eq!(first.metadata.status, AnalysisStatus::Completed);

    let second = agent
        .analyze_product("https://shop.example.com/dp/SW3000", None)
        .await
        .unwrap();
    assert_eq!(second.metadata.status, AnalysisStatus::Cached);
    assert_eq!(second.recommendation.score, first.recommendation.score);
}

#[tokio::test]
async fn test_total_retrieval_failure_degrades_to_partial_analysis() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/extract"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;
    // The fallback direct fetch of the listing fails too
    Mock::given(method("GET"))
        .and(path("/p/broken"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_empty_search_fallback(&server).await;

    let agent = agent_for(&server, None).await;
    let url = format!("{}/p/broken", server.uri());
    let analysis = agent.analyze_product(&url, None).await.unwrap();

    assert_eq!(analysis.metadata.status, AnalysisStatus::PartiallyFailed);
    assert!(!analysis.metadata.search_used);
    assert_eq!(analysis.title, url);
    assert!(analysis.manipulation_claims.is_empty());
    assert!(analysis.alternatives.is_empty());

    // Clean (if empty) signals still produce a usable verdict
    assert_eq!(analysis.recommendation.score, 83.5);
    assert_eq!(analysis.recommendation.verdict, Verdict::Buy);
}

#[tokio::test]
async fn test_analysis_with_user_is_persisted() {
    let server = MockServer::start().await;
    mount_manipulative_listing(&server).await;

    let store = SqliteStore::new_in_memory().await.unwrap();
    let agent = agent_for(&server, Some(store)).await;

    let analysis = agent
        .analyze_product("https://shop.example.com/dp/SW3000", Some("u1"))
        .await
        .unwrap();
    assert!(analysis.metadata.store_persisted);

    let history = agent.get_browsing_history("u1", None).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].url, "https://shop.example.com/dp/SW3000");
    assert!(history[0].metadata.store_persisted);

    let session = agent.get_user_session("u1").await.unwrap();
    assert_eq!(session.product_count, 1);

    // A cached repeat does not grow the history
    let cached = agent
        .analyze_product("https://shop.example.com/dp/SW3000", Some("u1"))
        .await
        .unwrap();
    assert_eq!(cached.metadata.status, AnalysisStatus::Cached);
    let history = agent.get_browsing_history("u1", None).await.unwrap();
    assert_eq!(history.len(), 1);
}
