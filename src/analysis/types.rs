use serde::{Deserialize, Serialize};

use crate::cache::CacheValidate;

/// Claim category names, shared by the detector, verifier, and scorer
pub mod claim_categories {
    pub const URGENCY: &str = "Urgency/scarcity pressure";
    pub const EXCLUSIVITY: &str = "Fake exclusivity claims";
    pub const IMPULSE: &str = "Impulse purchase triggers";
    pub const REVIEWS: &str = "Potential review manipulation";
    pub const PRICING: &str = "Price manipulation tactics";

    /// Categories that are marketing boilerplate regardless of evidence
    pub const INHERENTLY_SUSPICIOUS: [&str; 3] = [URGENCY, EXCLUSIVITY, IMPULSE];
}

/// Product details extracted from a listing page.
///
/// Built once by the retrieval stage and immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInfo {
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
}

impl ProductInfo {
    /// Lowest-information product info: retrieval failed entirely
    pub fn degraded(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            title: url.clone(),
            url,
            description: String::new(),
            price: None,
            currency: None,
            brand: None,
        }
    }
}

/// A detected manipulative-marketing phrase with its category.
///
/// `verified` stays `None` until the verifier runs; once set it is never
/// re-evaluated within a pipeline execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManipulationClaim {
    #[serde(rename = "type")]
    pub claim_type: String,
    pub claim: String,
    pub found_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_evidence: Option<String>,
    /// True when the verification came from cache
    #[serde(default)]
    pub cached: bool,
}

/// What kind of alternative a discovered listing is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlternativeKind {
    Used,
    Rent,
    Repair,
    Alternative,
    Wait,
}

impl std::fmt::Display for AlternativeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlternativeKind::Used => write!(f, "used"),
            AlternativeKind::Rent => write!(f, "rent"),
            AlternativeKind::Repair => write!(f, "repair"),
            AlternativeKind::Alternative => write!(f, "alternative"),
            AlternativeKind::Wait => write!(f, "wait"),
        }
    }
}

/// A cheaper or equivalent listing discovered for the product
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alternative {
    #[serde(rename = "type")]
    pub kind: AlternativeKind,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// Current price minus alternative price; negative when the
    /// alternative is more expensive (deliberately unclamped).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub savings: Option<f64>,
}

/// Purchase verdict, a pure step function of the final score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Verdict {
    Buy,
    Wait,
    Avoid,
    FindAlternative,
}

impl Verdict {
    /// Map a clamped score to its verdict
    pub fn from_score(score: f64) -> Self {
        if score < 30.0 {
            Verdict::Avoid
        } else if score < 50.0 {
            Verdict::FindAlternative
        } else if score < 75.0 {
            Verdict::Wait
        } else {
            Verdict::Buy
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Buy => write!(f, "buy"),
            Verdict::Wait => write!(f, "wait"),
            Verdict::Avoid => write!(f, "avoid"),
            Verdict::FindAlternative => write!(f, "find-alternative"),
        }
    }
}

/// Final recommendation, derived deterministically from the other signals
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    /// 0-100; higher = better to buy
    pub score: f64,
    pub reasoning: String,
    pub detailed_reasoning: String,
    pub verdict: Verdict,
}

/// Round a raw score to 2 decimals and clamp it into [0, 100]
pub fn clamp_score(score: f64) -> f64 {
    ((score * 100.0).round() / 100.0).clamp(0.0, 100.0)
}

/// Terminal state of one pipeline execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisStatus {
    /// Served from the full-analysis cache; no stage ran
    Cached,
    /// All stages ran with their primary paths
    Completed,
    /// One or more stages degraded to a fallback result
    PartiallyFailed,
}

/// Execution metadata attached to an analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetadata {
    /// Unix milliseconds when the analysis started
    pub crawled_at: i64,
    /// True when the search service was reachable and used
    pub search_used: bool,
    /// True when the analysis was persisted to the durable store
    pub store_persisted: bool,
    pub status: AnalysisStatus,
}

/// Aggregate analysis result; the unit of caching and the pipeline output
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductAnalysis {
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    pub manipulation_signals: Vec<String>,
    pub manipulation_claims: Vec<ManipulationClaim>,
    pub alternatives: Vec<Alternative>,
    pub recommendation: Recommendation,
    pub metadata: AnalysisMetadata,
}

impl CacheValidate for ProductAnalysis {
    fn is_valid(&self) -> bool {
        !self.url.is_empty()
    }
}

/// A user's budget window
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BudgetRange {
    pub min: f64,
    pub max: f64,
}

/// An alert condition attached to preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceAlert {
    pub product_id: String,
    pub condition: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
}

/// User preferences, read-only input to scoring
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_range: Option<BudgetRange>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alerts: Vec<PreferenceAlert>,
}

impl UserPreferences {
    /// Overlay another preference set on top of this one, field by field
    pub fn merge(mut self, update: UserPreferences) -> Self {
        if update.budget_range.is_some() {
            self.budget_range = update.budget_range;
        }
        if !update.values.is_empty() {
            self.values = update.values;
        }
        if !update.categories.is_empty() {
            self.categories = update.categories;
        }
        if !update.alerts.is_empty() {
            self.alerts = update.alerts;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_verdict_thresholds() {
        assert_eq!(Verdict::from_score(0.0), Verdict::Avoid);
        assert_eq!(Verdict::from_score(29.99), Verdict::Avoid);
        assert_eq!(Verdict::from_score(30.0), Verdict::FindAlternative);
        assert_eq!(Verdict::from_score(49.99), Verdict::FindAlternative);
        assert_eq!(Verdict::from_score(50.0), Verdict::Wait);
        assert_eq!(Verdict::from_score(74.99), Verdict::Wait);
        assert_eq!(Verdict::from_score(75.0), Verdict::Buy);
        assert_eq!(Verdict::from_score(100.0), Verdict::Buy);
    }

    #[test]
    fn test_verdict_is_monotonic_in_score() {
        let order = |v: Verdict| match v {
            Verdict::Avoid => 0,
            Verdict::FindAlternative => 1,
            Verdict::Wait => 2,
            Verdict::Buy => 3,
        };

        let mut previous = 0;
        for step in 0..=1000 {
            let score = step as f64 / 10.0;
            let rank = order(Verdict::from_score(score));
            assert!(rank >= previous, "verdict regressed at score {}", score);
            previous = rank;
        }
    }

    #[test]
    fn test_clamp_score_bounds_and_rounding() {
        assert_eq!(clamp_score(-12.3), 0.0);
        assert_eq!(clamp_score(123.4), 100.0);
        assert_eq!(clamp_score(66.666), 66.67);
        assert_eq!(clamp_score(75.0), 75.0);
    }

    #[test]
    fn test_claim_serializes_with_original_field_names() {
        let claim = ManipulationClaim {
            claim_type: claim_categories::URGENCY.to_string(),
            claim: "only 3 left".to_string(),
            found_text: "Only 3 Left".to_string(),
            verified: Some(false),
            verification_evidence: Some("commonly used in marketing".to_string()),
            cached: false,
        };

        let json = serde_json::to_value(&claim).unwrap();
        assert_eq!(json["type"], claim_categories::URGENCY);
        assert_eq!(json["foundText"], "Only 3 Left");
        assert_eq!(json["verificationEvidence"], "commonly used in marketing");
    }

    #[test]
    fn test_verdict_serializes_kebab_case() {
        let json = serde_json::to_value(Verdict::FindAlternative).unwrap();
        assert_eq!(json, "find-alternative");
    }

    #[test]
    fn test_preferences_merge_overlays_only_set_fields() {
        let base = UserPreferences {
            budget_range: Some(BudgetRange { min: 0.0, max: 150.0 }),
            values: vec!["sustainability".to_string()],
            ..Default::default()
        };

        let merged = base.merge(UserPreferences {
            values: vec!["minimalism".to_string()],
            ..Default::default()
        });

        assert_eq!(merged.budget_range.unwrap().max, 150.0);
        assert_eq!(merged.values, vec!["minimalism".to_string()]);
    }

    #[test]
    fn test_degraded_product_info_uses_url_as_title() {
        let info = ProductInfo::degraded("https://example.com/p/1");
        assert_eq!(info.title, "https://example.com/p/1");
        assert!(info.price.is_none());
        assert!(info.description.is_empty());
    }
}
