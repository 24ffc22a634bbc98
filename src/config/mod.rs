use std::env;
use std::path::PathBuf;

use crate::error::AppError;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Search/extraction service credentials. `None` disables claim
    /// verification, alternative discovery, and price-drop analysis.
    pub tavily: Option<TavilyConfig>,
    /// Semantic cache service credentials. `None` disables the similarity
    /// tier; the in-process exact tier still works.
    pub langcache: Option<LangCacheConfig>,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub request: RequestConfig,
    pub cache: CacheConfig,
}

/// Search/extraction API configuration
#[derive(Debug, Clone)]
pub struct TavilyConfig {
    pub api_key: String,
    pub base_url: String,
}

/// Semantic cache API configuration
#[derive(Debug, Clone)]
pub struct LangCacheConfig {
    pub api_key: String,
    pub base_url: String,
    pub cache_id: String,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub max_connections: u32,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// HTTP request configuration
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

/// Cache tier tuning
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for the in-process exact-match tier, in seconds.
    pub memory_ttl_secs: u64,
    /// Similarity threshold for full-analysis lookups.
    pub analysis_threshold: f64,
    /// Similarity threshold for crawl lookups (near-exact URL match).
    pub crawl_threshold: f64,
    /// Similarity threshold for alternative-search lookups.
    pub alternatives_threshold: f64,
    /// Similarity threshold for claim-verification lookups.
    pub verification_threshold: f64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let tavily = env::var("TAVILY_API_KEY").ok().map(|api_key| TavilyConfig {
            api_key,
            base_url: env::var("TAVILY_BASE_URL")
                .unwrap_or_else(|_| "https://api.tavily.com".to_string()),
        });

        // All three langcache variables are required for the similarity tier
        let langcache = match (
            env::var("LANGCACHE_HOST").ok(),
            env::var("LANGCACHE_API_KEY").ok(),
            env::var("LANGCACHE_CACHE_ID").ok(),
        ) {
            (Some(host), Some(api_key), Some(cache_id)) => Some(LangCacheConfig {
                api_key,
                base_url: if host.starts_with("http") {
                    host
                } else {
                    format!("https://{}", host)
                },
                cache_id,
            }),
            _ => None,
        };

        let database = DatabaseConfig {
            path: PathBuf::from(
                env::var("DATABASE_PATH").unwrap_or_else(|_| "./data/reclaim.db".to_string()),
            ),
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        };

        let request = RequestConfig {
            timeout_ms: env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30000),
            max_retries: env::var("MAX_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3),
            retry_delay_ms: env::var("RETRY_DELAY_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1000),
        };

        let cache = CacheConfig {
            memory_ttl_secs: env::var("CACHE_MEMORY_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3600),
            analysis_threshold: threshold_var("CACHE_ANALYSIS_THRESHOLD", 0.85),
            crawl_threshold: threshold_var("CACHE_CRAWL_THRESHOLD", 0.98),
            alternatives_threshold: threshold_var("CACHE_ALTERNATIVES_THRESHOLD", 0.85),
            verification_threshold: threshold_var("CACHE_VERIFICATION_THRESHOLD", 0.90),
        };

        Ok(Config {
            tavily,
            langcache,
            database,
            logging,
            request,
            cache,
        })
    }
}

fn threshold_var(name: &str, default: f64) -> f64 {
    env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|t| (0.0..=1.0).contains(t))
        .unwrap_or(default)
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30000,
            max_retries: 3,
            retry_delay_ms: 1000,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            memory_ttl_secs: 3600,
            analysis_threshold: 0.85,
            crawl_threshold: 0.98,
            alternatives_threshold: 0.85,
            verification_threshold: 0.90,
        }
    }
}
