use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Search error: {0}")]
    Tavily(#[from] TavilyError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Durable store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database connection failed: {message}")]
    Connection { message: String },

    #[error("Migration failed: {message}")]
    Migration { message: String },

    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// Search/extraction service errors
#[derive(Debug, Error)]
pub enum TavilyError {
    #[error("Search client is not configured (missing API key)")]
    NotConfigured,

    #[error("Extraction failed for {url} after {attempts} attempts: {message}")]
    ExtractionFailed {
        url: String,
        attempts: u32,
        message: String,
    },

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Semantic cache service errors
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache backend unavailable: {message}")]
    Backend { message: String },

    #[error("Malformed cache entry: {message}")]
    Malformed { message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for durable store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type alias for search/extraction operations
pub type TavilyResult<T> = Result<T, TavilyError>;

/// Result type alias for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::Config {
            message: "missing key".to_string(),
        };
        assert_eq!(err.to_string(), "Configuration error: missing key");

        let err = AppError::Internal {
            message: "unexpected".to_string(),
        };
        assert_eq!(err.to_string(), "Internal error: unexpected");
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Connection {
            message: "failed to connect".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Database connection failed: failed to connect"
        );

        let err = StoreError::Migration {
            message: "version mismatch".to_string(),
        };
        assert_eq!(err.to_string(), "Migration failed: version mismatch");
    }

    #[test]
    fn test_tavily_error_display() {
        let err = TavilyError::ExtractionFailed {
            url: "https://example.com/p/1".to_string(),
            attempts: 3,
            message: "empty content".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Extraction failed for https://example.com/p/1 after 3 attempts: empty content"
        );

        let err = TavilyError::Api {
            status: 401,
            message: "unauthorized".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 401 - unauthorized");

        let err = TavilyError::Timeout { timeout_ms: 5000 };
        assert_eq!(err.to_string(), "Request timeout after 5000ms");
    }

    #[test]
    fn test_cache_error_display() {
        let err = CacheError::Malformed {
            message: "not valid JSON".to_string(),
        };
        assert_eq!(err.to_string(), "Malformed cache entry: not valid JSON");

        let err = CacheError::Backend {
            message: "connection refused".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Cache backend unavailable: connection refused"
        );
    }

    #[test]
    fn test_error_conversion_to_app_error() {
        let store_err = StoreError::Connection {
            message: "bad".to_string(),
        };
        let app_err: AppError = store_err.into();
        assert!(matches!(app_err, AppError::Store(_)));

        let tavily_err = TavilyError::Timeout { timeout_ms: 1000 };
        let app_err: AppError = tavily_err.into();
        assert!(matches!(app_err, AppError::Tavily(_)));

        let cache_err = CacheError::Backend {
            message: "connection refused".to_string(),
        };
        let app_err: AppError = cache_err.into();
        assert!(matches!(app_err, AppError::Cache(_)));
    }
}
