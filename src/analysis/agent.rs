use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::detector::ClaimDetector;
use super::discovery::AlternativeFinder;
use super::retrieval::ContentRetriever;
use super::scoring::RecommendationScorer;
use super::types::{
    AnalysisMetadata, AnalysisStatus, ProductAnalysis, ProductInfo, UserPreferences,
};
use super::verifier::ClaimVerifier;
use crate::cache::CacheLayer;
use crate::config::RequestConfig;
use crate::error::{AppError, AppResult};
use crate::store::{keys, DurableStore, PriceAlert, UserSession};
use crate::tavily::TavilyClient;

const SESSION_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 7);
const ANALYSIS_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 30);
const HISTORY_CAP: i64 = 100;
const DEFAULT_HISTORY_LIMIT: usize = 10;

/// The full purchase-recommendation pipeline.
///
/// Holds every stage plus the shared cache and the optional durable
/// store; constructed once at startup and reused for all requests. Only
/// total retrieval failure surfaces to the result as a degraded analysis;
/// every other stage falls back to a neutral value on error.
pub struct ReclaimAgent {
    retriever: ContentRetriever,
    detector: ClaimDetector,
    verifier: ClaimVerifier,
    finder: AlternativeFinder,
    scorer: RecommendationScorer,
    cache: Arc<CacheLayer>,
    store: Option<Arc<dyn DurableStore>>,
}

impl ReclaimAgent {
    /// Wire the pipeline stages around the injected clients
    pub fn new(
        tavily: Option<TavilyClient>,
        cache: Arc<CacheLayer>,
        store: Option<Arc<dyn DurableStore>>,
        request_config: RequestConfig,
    ) -> AppResult<Self> {
        let retriever =
            ContentRetriever::new(tavily.clone(), Arc::clone(&cache), request_config)?;

        Ok(Self {
            retriever,
            detector: ClaimDetector::new(),
            verifier: ClaimVerifier::new(tavily.clone(), Arc::clone(&cache)),
            finder: AlternativeFinder::new(tavily.clone(), Arc::clone(&cache)),
            scorer: RecommendationScorer::new(tavily),
            cache,
            store,
        })
    }

    fn analysis_prompt(url: &str) -> String {
        format!("Analyze product: {}", url)
    }

    /// Analyze a product listing URL end to end.
    ///
    /// Checks the full-analysis cache first; on a miss runs retrieval,
    /// discovery, detection, verification, and scoring, then persists the
    /// result best-effort.
    pub async fn analyze_product(
        &self,
        url: &str,
        user_id: Option<&str>,
    ) -> AppResult<ProductAnalysis> {
        let prompt = Self::analysis_prompt(url);
        let threshold = self.cache.config().analysis_threshold;

        if let Some(mut cached) = self
            .cache
            .get::<ProductAnalysis>(url, &prompt, threshold)
            .await
        {
            info!(url = %url, "Full analysis served from cache");
            cached.metadata.status = AnalysisStatus::Cached;
            return Ok(cached);
        }

        let crawled_at = Utc::now().timestamp_millis();
        let mut status = AnalysisStatus::Completed;
        let mut search_used = false;

        let product_info = match self.retriever.retrieve(url).await {
            Ok(crawl) => {
                search_used = true;
                self.retriever.build_product_info(url, &crawl)
            }
            Err(e) => {
                warn!(url = %url, error = %e, "Content retrieval failed, degrading");
                status = AnalysisStatus::PartiallyFailed;
                ProductInfo::degraded(url)
            }
        };

        let product_name = self.finder.clean_product_name(&product_info.title);

        let alternatives = if product_name.len() > 3
            && product_name.to_lowercase() != "amazon.com"
        {
            self.finder
                .discover(&product_name, product_info.price)
                .await
        } else {
            Vec::new()
        };

        let detection = self
            .detector
            .detect(&product_info.title, &product_info.description);
        let verification_name = if product_name.is_empty() {
            product_info.title.as_str()
        } else {
            product_name.as_str()
        };
        let claims = if detection.claims.is_empty() {
            Vec::new()
        } else {
            self.verifier
                .verify_all(detection.claims, verification_name)
                .await
        };

        let prefs = match user_id {
            Some(user) => self.load_preferences(user).await,
            None => UserPreferences::default(),
        };

        let recommendation = self
            .scorer
            .score(&product_info, &claims, &alternatives, &prefs, &product_name)
            .await;

        let mut analysis = ProductAnalysis {
            url: product_info.url,
            title: product_info.title,
            description: product_info.description,
            price: product_info.price,
            currency: product_info.currency,
            brand: product_info.brand,
            manipulation_signals: detection.signals,
            manipulation_claims: claims,
            alternatives,
            recommendation,
            metadata: AnalysisMetadata {
                crawled_at,
                search_used,
                store_persisted: false,
                status,
            },
        };

        if let Some(user) = user_id {
            let mut to_store = analysis.clone();
            to_store.metadata.store_persisted = true;
            match self.persist_analysis(user, &to_store).await {
                Ok(()) => analysis.metadata.store_persisted = true,
                Err(e) => warn!(user = %user, error = %e, "Failed to persist analysis"),
            }
        }

        self.cache.put(&analysis.url, &prompt, &analysis).await;

        Ok(analysis)
    }

    fn require_store(&self) -> AppResult<&Arc<dyn DurableStore>> {
        self.store.as_ref().ok_or_else(|| AppError::Config {
            message: "Durable store is not configured".to_string(),
        })
    }

    /// Get the user's session, creating one with a 7-day expiry if absent
    pub async fn get_user_session(&self, user_id: &str) -> AppResult<UserSession> {
        let store = self.require_store()?;
        let key = keys::session(user_id);

        if let Some(raw) = store.get(&key).await? {
            if let Ok(session) = serde_json::from_str::<UserSession>(&raw) {
                return Ok(session);
            }
            warn!(user = %user_id, "Stored session is unreadable, recreating");
        }

        let session = UserSession::new(user_id);
        let payload = serde_json::to_string(&session).map_err(internal)?;
        store.set(&key, &payload, Some(SESSION_TTL)).await?;
        Ok(session)
    }

    /// Persist an analysis for a user: 30-day retention, history list
    /// trimmed to the most recent entries, session counters updated
    async fn persist_analysis(&self, user_id: &str, analysis: &ProductAnalysis) -> AppResult<()> {
        let store = self.require_store()?;
        let now = Utc::now().timestamp_millis();

        let analysis_key = keys::analysis(user_id, now);
        let payload = serde_json::to_string(analysis).map_err(internal)?;
        store.set(&analysis_key, &payload, Some(ANALYSIS_TTL)).await?;

        let history_key = keys::history(user_id);
        store.list_push(&history_key, &analysis_key).await?;
        store.list_trim(&history_key, 0, HISTORY_CAP - 1).await?;

        let mut session = self.get_user_session(user_id).await?;
        session.product_count += 1;
        session.last_active = now;
        let session_payload = serde_json::to_string(&session).map_err(internal)?;
        store
            .set(&keys::session(user_id), &session_payload, Some(SESSION_TTL))
            .await?;

        Ok(())
    }

    /// Resolve the user's most recent analyses, newest first
    pub async fn get_browsing_history(
        &self,
        user_id: &str,
        limit: Option<usize>,
    ) -> AppResult<Vec<ProductAnalysis>> {
        let store = self.require_store()?;
        let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
        // A stop index of limit - 1 would underflow to an unbounded range
        if limit == 0 {
            return Ok(Vec::new());
        }

        let history_key = keys::history(user_id);
        let analysis_keys = store.list_range(&history_key, 0, limit as i64 - 1).await?;

        let mut analyses = Vec::with_capacity(analysis_keys.len());
        for key in analysis_keys {
            // Expired or unreadable entries are skipped, not errors
            if let Some(raw) = store.get(&key).await? {
                match serde_json::from_str::<ProductAnalysis>(&raw) {
                    Ok(analysis) => analyses.push(analysis),
                    Err(e) => warn!(key = %key, error = %e, "Skipping unreadable analysis"),
                }
            }
        }

        Ok(analyses)
    }

    /// Stored preferences for a user, or the defaults
    pub async fn get_user_preferences(&self, user_id: &str) -> AppResult<UserPreferences> {
        let store = self.require_store()?;
        let raw = store.get(&keys::preferences(user_id)).await?;
        Ok(raw
            .and_then(|r| serde_json::from_str(&r).ok())
            .unwrap_or_default())
    }

    /// Merge a preference update into the user's stored preferences
    pub async fn set_user_preferences(
        &self,
        user_id: &str,
        update: UserPreferences,
    ) -> AppResult<UserPreferences> {
        let store = self.require_store()?;

        let existing = self.get_user_preferences(user_id).await?;
        let merged = existing.merge(update);

        let payload = serde_json::to_string(&merged).map_err(internal)?;
        store.set(&keys::preferences(user_id), &payload, None).await?;
        Ok(merged)
    }

    /// Register a price alert for a product and index it under the user
    pub async fn create_price_alert(
        &self,
        user_id: &str,
        product_id: &str,
        threshold: f64,
    ) -> AppResult<PriceAlert> {
        let store = self.require_store()?;

        let alert = PriceAlert {
            user_id: user_id.to_string(),
            product_id: product_id.to_string(),
            threshold,
            created_at: Utc::now().timestamp_millis(),
            triggered: false,
        };

        let alert_key = keys::alert(product_id);
        let payload = serde_json::to_string(&alert).map_err(internal)?;
        store.list_push(&alert_key, &payload).await?;
        store.set_add(&keys::user_alerts(user_id), &alert_key).await?;

        Ok(alert)
    }

    /// Preference load inside the pipeline never fails the analysis
    async fn load_preferences(&self, user_id: &str) -> UserPreferences {
        match self.get_user_preferences(user_id).await {
            Ok(prefs) => prefs,
            Err(e) => {
                warn!(user = %user_id, error = %e, "Preference load failed, using defaults");
                UserPreferences::default()
            }
        }
    }
}

fn internal(e: serde_json::Error) -> AppError {
    AppError::Internal {
        message: e.to_string(),
    }
}
