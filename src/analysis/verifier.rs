use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info};

use super::types::{claim_categories, ManipulationClaim};
use crate::cache::{CacheLayer, CacheValidate};
use crate::tavily::{SearchDepth, SearchRequest, TavilyClient};

const DEBUNKING_TERMS: [&str; 7] = [
    "not true",
    "false",
    "misleading",
    "scam",
    "fake",
    "exaggerated",
    "not verified",
];

const VERIFYING_TERMS: [&str; 5] = ["confirmed", "verified", "true", "legitimate", "real"];

// A cached verification must actually carry verification fields
impl CacheValidate for ManipulationClaim {
    fn is_valid(&self) -> bool {
        self.verified.is_some() || self.verification_evidence.is_some()
    }
}

/// Cross-checks detected claims against external search evidence.
///
/// Verification never fails a pipeline: service errors produce an
/// unverified claim carrying the error text as evidence.
pub struct ClaimVerifier {
    tavily: Option<TavilyClient>,
    cache: Arc<CacheLayer>,
}

impl ClaimVerifier {
    /// Create a verifier
    pub fn new(tavily: Option<TavilyClient>, cache: Arc<CacheLayer>) -> Self {
        Self { tavily, cache }
    }

    fn prompt(product_name: &str, claim: &ManipulationClaim) -> String {
        format!(
            "Verify marketing claim: {} {} {}",
            product_name, claim.claim_type, claim.claim
        )
    }

    /// Verify every claim concurrently, preserving input order in the output
    pub async fn verify_all(
        &self,
        claims: Vec<ManipulationClaim>,
        product_name: &str,
    ) -> Vec<ManipulationClaim> {
        let futures = claims
            .into_iter()
            .map(|claim| self.verify(claim, product_name));
        join_all(futures).await
    }

    /// Verify a single claim, merging verification fields into it
    pub async fn verify(
        &self,
        claim: ManipulationClaim,
        product_name: &str,
    ) -> ManipulationClaim {
        // Without a search client verification never ran; the claim stays
        // unverified and scoring applies no debunked penalty.
        let tavily = match &self.tavily {
            Some(client) => client,
            None => {
                debug!(claim = %claim.claim, "Search client not configured, skipping verification");
                return claim;
            }
        };

        let prompt = Self::prompt(product_name, &claim);
        let threshold = self.cache.config().verification_threshold;

        if let Some(hit) = self
            .cache
            .get::<ManipulationClaim>(&prompt, &prompt, threshold)
            .await
        {
            info!(claim = %claim.claim, "Claim verification cache hit");
            return ManipulationClaim {
                verified: hit.verified,
                verification_evidence: hit.verification_evidence,
                cached: true,
                ..claim
            };
        }

        debug!(claim = %claim.claim, "Claim verification cache miss, searching");

        let query = format!(
            "{} {} {} verify check",
            product_name, claim.claim_type, claim.claim
        );
        let request = SearchRequest::new(query)
            .with_depth(SearchDepth::Advanced)
            .with_max_results(5);

        let results = match tavily.search(request).await {
            Ok(response) => response.results,
            Err(e) => {
                return ManipulationClaim {
                    verified: Some(false),
                    verification_evidence: Some(format!("Verification failed: {}", e)),
                    cached: false,
                    ..claim
                };
            }
        };

        let mut evidence_found = false;
        let mut evidence_text = String::new();

        for result in &results {
            let combined = format!(
                "{} {}",
                result.content.to_lowercase(),
                result.title.to_lowercase()
            );

            let has_debunking = DEBUNKING_TERMS.iter().any(|t| combined.contains(t));
            let has_verifying = VERIFYING_TERMS.iter().any(|t| combined.contains(t));

            if has_debunking {
                evidence_found = true;
                evidence_text = format!(
                    "Found evidence suggesting this claim may be misleading: {}",
                    result.title
                );
                break;
            } else if has_verifying {
                // Supporting evidence; keep scanning, a later debunking
                // hit still overrides.
                evidence_found = true;
                evidence_text = format!("Found supporting evidence: {}", result.title);
            }
        }

        if !evidence_found
            && claim_categories::INHERENTLY_SUSPICIOUS.contains(&claim.claim_type.as_str())
        {
            evidence_text = format!(
                "This type of claim ({}) is commonly used in marketing and may not reflect actual scarcity or exclusivity.",
                claim.claim_type
            );
        }

        let verified = evidence_found && !evidence_text.contains("misleading");
        let verified_claim = ManipulationClaim {
            verified: Some(verified),
            verification_evidence: Some(if evidence_text.is_empty() {
                "No clear verification found".to_string()
            } else {
                evidence_text
            }),
            cached: false,
            ..claim
        };

        self.cache.put(&prompt, &prompt, &verified_claim).await;

        verified_claim
    }
}
