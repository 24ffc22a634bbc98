//! Integration tests for the semantic cache tier and the layered
//! read-through behavior over a mocked backend.

use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use reclaim::cache::{CacheLayer, CacheValidate, LangCacheClient};
use reclaim::config::{CacheConfig, LangCacheConfig, RequestConfig};

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Payload {
    title: String,
}

impl CacheValidate for Payload {
    fn is_valid(&self) -> bool {
        !self.title.is_empty()
    }
}

fn client_for(server: &MockServer) -> LangCacheClient {
    let config = LangCacheConfig {
        api_key: "cache-key".to_string(),
        base_url: server.uri(),
        cache_id: "cache-1".to_string(),
    };
    LangCacheClient::new(&config, &RequestConfig::default()).expect("client creation")
}

fn layer_for(server: &MockServer) -> CacheLayer {
    CacheLayer::new(CacheConfig::default(), Some(client_for(server)))
}

#[tokio::test]
async fn test_search_posts_prompt_and_threshold() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/caches/cache-1/entries/search"))
        .and(header("Authorization", "Bearer cache-key"))
        .and(body_partial_json(serde_json::json!({
            "prompt": "Analyze product: https://example.com/p/1",
            "similarityThreshold": 0.85
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{"response": "{\"title\":\"Chair\"}", "similarity": 0.93}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let candidates = client
        .search("Analyze product: https://example.com/p/1", 0.85)
        .await
        .unwrap();

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].similarity, Some(0.93));
}

#[tokio::test]
async fn test_semantic_hit_backfills_exact_tier() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/caches/cache-1/entries/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{"response": "{\"title\":\"Chair\"}", "similarity": 0.9}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let layer = layer_for(&server);

    let first: Option<Payload> = layer.get("key", "prompt", 0.85).await;
    assert_eq!(first.unwrap().title, "Chair");

    // Second lookup is served from the exact tier; the mock allows only
    // one backend call.
    let second: Option<Payload> = layer.get("key", "prompt", 0.85).await;
    assert_eq!(second.unwrap().title, "Chair");
}

#[tokio::test]
async fn test_malformed_candidate_is_a_miss() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/caches/cache-1/entries/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{"response": "not json at all"}]
        })))
        .mount(&server)
        .await;

    let layer = layer_for(&server);
    let hit: Option<Payload> = layer.get("key", "prompt", 0.85).await;
    assert!(hit.is_none());
}

#[tokio::test]
async fn test_backend_failure_is_a_miss_not_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/caches/cache-1/entries/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let layer = layer_for(&server);
    let hit: Option<Payload> = layer.get("key", "prompt", 0.85).await;
    assert!(hit.is_none());
}

#[tokio::test]
async fn test_put_writes_through_to_the_backend() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/caches/cache-1/entries"))
        .and(body_partial_json(serde_json::json!({
            "prompt": "Crawl URL content: https://example.com/p/1"
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let layer = layer_for(&server);
    layer
        .put(
            "https://example.com/p/1",
            "Crawl URL content: https://example.com/p/1",
            &Payload {
                title: "Chair".to_string(),
            },
        )
        .await;
}

#[tokio::test]
async fn test_write_failure_does_not_poison_the_exact_tier() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/caches/cache-1/entries"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/caches/cache-1/entries/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": []})))
        .mount(&server)
        .await;

    let layer = layer_for(&server);
    let value = Payload {
        title: "Chair".to_string(),
    };
    layer.put("key", "prompt", &value).await;

    // The backend write failed but the exact tier still serves the value
    let hit: Option<Payload> = layer.get("key", "prompt", 0.85).await;
    assert_eq!(hit, Some(value));
}
