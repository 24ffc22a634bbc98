//! The product-analysis pipeline.
//!
//! Five stages run in a fixed order: content retrieval, alternative
//! discovery, claim detection, claim verification, and scoring.
//! [`ReclaimAgent`] orchestrates them and owns persistence; each stage is
//! independently constructible for testing.

mod agent;
mod detector;
mod discovery;
mod retrieval;
mod scoring;
mod types;
mod verifier;

pub use agent::ReclaimAgent;
pub use detector::{ClaimDetector, Detection};
pub use discovery::AlternativeFinder;
pub use retrieval::{clean_listing_title, ContentRetriever, CrawlResult};
pub use scoring::{Likelihood, PriceDropAnalysis, RecommendationScorer};
pub use types::{
    claim_categories, clamp_score, AlternativeKind, Alternative, AnalysisMetadata,
    AnalysisStatus, BudgetRange, ManipulationClaim, PreferenceAlert, ProductAnalysis,
    ProductInfo, Recommendation, UserPreferences, Verdict,
};
pub use verifier::ClaimVerifier;
