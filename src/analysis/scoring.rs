use chrono::{Datelike, Utc};
use regex::Regex;
use tracing::{debug, warn};

use super::types::{
    clamp_score, claim_categories, Alternative, ManipulationClaim, ProductInfo, Recommendation,
    UserPreferences, Verdict,
};
use crate::tavily::{SearchDepth, SearchRequest, TavilyClient};

/// How likely the product's price is to drop soon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Likelihood {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for Likelihood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Likelihood::High => write!(f, "high"),
            Likelihood::Medium => write!(f, "medium"),
            Likelihood::Low => write!(f, "low"),
        }
    }
}

/// Evidence-backed price-drop assessment
#[derive(Debug, Clone)]
pub struct PriceDropAnalysis {
    pub likelihood: Likelihood,
    pub reasons: Vec<String>,
}

const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Turns the gathered signals into a deterministic 0-100 score and verdict.
///
/// Scoring starts at 75 and applies independent adjustments; the search
/// client is only consulted for the price-drop heuristic and its absence
/// simply skips that adjustment.
pub struct RecommendationScorer {
    tavily: Option<TavilyClient>,
    new_version: Regex,
    year: Regex,
    competition: Regex,
    electronics: Regex,
    price_signal: Regex,
}

impl RecommendationScorer {
    /// Create a scorer; `tavily = None` disables price-drop analysis
    pub fn new(tavily: Option<TavilyClient>) -> Self {
        Self {
            tavily,
            new_version: Regex::new(
                r"(?i)\b(new version|upcoming|release|refresh|model|generation|next|coming soon)\b",
            )
            .expect("lifecycle pattern is a valid regex"),
            year: Regex::new(r"\b(20\d{2})\b").expect("year pattern is a valid regex"),
            competition: Regex::new(
                r"(?i)\b(competitor|rival|alternative|similar product|cheaper|price war|market competition)\b",
            )
            .expect("competition pattern is a valid regex"),
            electronics: Regex::new(r"(?i)\b(electronics|tech|smartphone|laptop|gadget)\b")
                .expect("electronics pattern is a valid regex"),
            price_signal: Regex::new(r"(?i)\b(lowest|best price|price drop|discount|sale|clearance)\b")
                .expect("price pattern is a valid regex"),
        }
    }

    /// Produce the recommendation for one analyzed product
    pub async fn score(
        &self,
        product: &ProductInfo,
        claims: &[ManipulationClaim],
        alternatives: &[Alternative],
        prefs: &UserPreferences,
        product_name: &str,
    ) -> Recommendation {
        let price_drop = match &self.tavily {
            Some(client) if !product_name.is_empty() => {
                Some(self.analyze_price_drop(client, product_name, product.price).await)
            }
            _ => None,
        };

        self.compose(product, claims, alternatives, prefs, price_drop.as_ref())
    }

    /// Run the three evidence searches and accumulate price-drop signals
    async fn analyze_price_drop(
        &self,
        tavily: &TavilyClient,
        product_name: &str,
        current_price: Option<f64>,
    ) -> PriceDropAnalysis {
        let mut reasons: Vec<String> = Vec::new();
        let mut points: u32 = 0;

        let now = Utc::now();
        let current_year = now.year();
        let month0 = now.month0();

        let lifecycle_query = format!(
            "{} product lifecycle release date new version upcoming",
            product_name
        );
        let lifecycle = match tavily
            .search(
                SearchRequest::new(lifecycle_query)
                    .with_depth(SearchDepth::Advanced)
                    .with_max_results(5),
            )
            .await
        {
            Ok(response) => response.results,
            Err(e) => {
                warn!(error = %e, "Price-drop lifecycle search failed");
                reasons.push(
                    "Unable to complete detailed price trend analysis - web search encountered an error"
                        .to_string(),
                );
                return PriceDropAnalysis {
                    likelihood: Likelihood::Medium,
                    reasons,
                };
            }
        };

        let mut new_version_noted = false;
        let mut age_noted = false;

        for result in &lifecycle {
            let combined = format!(
                "{} {}",
                result.content.to_lowercase(),
                result.title.to_lowercase()
            );

            if !new_version_noted && self.new_version.is_match(&combined) {
                reasons.push(
                    "New version or refresh may be coming soon, which typically causes current model prices to drop 15-30%"
                        .to_string(),
                );
                points += 3;
                new_version_noted = true;
            }

            if !age_noted {
                if let Some(captures) = self.year.captures(&combined) {
                    if let Ok(mentioned) = captures[1].parse::<i32>() {
                        let age = current_year - mentioned;
                        if (2..=4).contains(&age) {
                            reasons.push(format!(
                                "Product is approximately {} years old - nearing typical discount period as newer models approach",
                                age
                            ));
                            points += 2;
                            age_noted = true;
                        } else if age > 4 {
                            reasons.push(format!(
                                "Product appears to be {}+ years old - likely at maximum discount, but may drop further during clearance",
                                age
                            ));
                            points += 1;
                            age_noted = true;
                        }
                    }
                }
            }
        }

        let trends_query = format!(
            "{} price drop discount sale trend competitor pricing",
            product_name
        );
        let trends = match tavily
            .search(
                SearchRequest::new(trends_query)
                    .with_depth(SearchDepth::Advanced)
                    .with_max_results(5),
            )
            .await
        {
            Ok(response) => response.results,
            Err(e) => {
                warn!(error = %e, "Price-drop trends search failed");
                reasons.push(
                    "Unable to complete detailed price trend analysis - web search encountered an error"
                        .to_string(),
                );
                return PriceDropAnalysis {
                    likelihood: Likelihood::Medium,
                    reasons,
                };
            }
        };

        let mut competition_noted = false;
        let mut season_noted = false;
        let mut electronics_noted = false;

        for result in &trends {
            let combined = format!(
                "{} {}",
                result.content.to_lowercase(),
                result.title.to_lowercase()
            );

            if !competition_noted && self.competition.is_match(&combined) {
                reasons.push(
                    "High competition in this product category may drive prices down as retailers compete"
                        .to_string(),
                );
                points += 2;
                competition_noted = true;
            }

            if !season_noted {
                if let Some((reason, season_points)) = seasonal_signal(month0) {
                    reasons.push(reason);
                    points += season_points;
                    season_noted = true;
                }
            }

            if !electronics_noted && self.electronics.is_match(&combined) {
                reasons.push(
                    "Electronics typically see price drops 6-12 months after release as manufacturing costs decrease and competition increases"
                        .to_string(),
                );
                points += 2;
                electronics_noted = true;
            }
        }

        if current_price.is_some() {
            let history_query = format!("{} price history chart lowest price best deal", product_name);
            match tavily
                .search(
                    SearchRequest::new(history_query)
                        .with_depth(SearchDepth::Advanced)
                        .with_max_results(3),
                )
                .await
            {
                Ok(response) => {
                    let volatile = response
                        .results
                        .iter()
                        .any(|r| self.price_signal.is_match(&r.content.to_lowercase()));
                    if volatile {
                        reasons.push(
                            "Price tracking suggests this product has had significant discounts in the past - current price may not be optimal"
                                .to_string(),
                        );
                        points += 2;
                    }
                }
                // Price history is supplementary; skip on failure
                Err(e) => debug!(error = %e, "Price history search failed"),
            }
        }

        if reasons.is_empty() {
            reasons.push(
                "Standard market dynamics suggest prices may fluctuate, but no strong indicators of imminent price drops"
                    .to_string(),
            );
            reasons.push(
                "Consider setting up price alerts if you're interested in this product".to_string(),
            );
        }

        PriceDropAnalysis {
            likelihood: likelihood_from_points(points),
            reasons,
        }
    }

    /// Deterministic score assembly; `price_drop = None` when the
    /// heuristic did not run
    pub fn compose(
        &self,
        product: &ProductInfo,
        claims: &[ManipulationClaim],
        alternatives: &[Alternative],
        prefs: &UserPreferences,
        price_drop: Option<&PriceDropAnalysis>,
    ) -> Recommendation {
        let mut score = 75.0;
        let mut breakdown: Vec<String> = Vec::new();
        let mut narrative: Vec<String> = Vec::new();

        if let Some(drop) = price_drop {
            match drop.likelihood {
                Likelihood::High => {
                    score -= 12.5;
                    breakdown.push(
                        "-12.5 points: High likelihood of price drop (see analysis below)"
                            .to_string(),
                    );
                }
                Likelihood::Medium => {
                    score -= 6.3;
                    breakdown.push("-6.3 points: Moderate likelihood of price drop".to_string());
                }
                Likelihood::Low => {
                    breakdown.push(
                        "+0 points: Low likelihood of price drop - current price appears stable"
                            .to_string(),
                    );
                }
            }
        }

        if !claims.is_empty() {
            let mut total_deduction = 0.0;
            for claim in claims {
                let mut deduction = 14.5;
                if claim.claim_type == claim_categories::URGENCY {
                    deduction += 2.3;
                } else if claim.claim_type == claim_categories::PRICING {
                    deduction += 1.8;
                } else if claim.claim_type == claim_categories::EXCLUSIVITY {
                    deduction += 1.5;
                }
                if claim_is_debunked(claim) {
                    deduction += 3.2;
                }
                total_deduction += deduction;
            }
            score -= total_deduction;

            let rounded = round1(total_deduction);
            breakdown.push(format!(
                "-{:.1} points: {} marketing claim(s) detected with severity analysis",
                rounded,
                claims.len()
            ));

            let mut section = vec![format!(
                "MARKETING CLAIMS DETECTED ({:.1} points deducted):",
                rounded
            )];
            for claim in claims {
                section.push(format!("  • \"{}\" - {}", claim.found_text, claim.claim_type));
                if let Some(evidence) = &claim.verification_evidence {
                    if claim_is_debunked(claim) || evidence.contains("commonly used") {
                        section.push(format!("    VERIFICATION: {}", evidence));
                        section.push(
                            "    This claim appears to be a marketing tactic and may not be accurate."
                                .to_string(),
                        );
                    } else {
                        section.push(format!("    VERIFICATION: {}", evidence));
                    }
                }
            }
            narrative.push(section.join("\n"));
        }

        if !alternatives.is_empty() {
            let positive_savings: f64 = alternatives
                .iter()
                .filter_map(|a| a.savings.filter(|s| *s > 0.0))
                .sum();
            let avg_savings = positive_savings / alternatives.len() as f64;

            let mut deduction = 9.5 * alternatives.len() as f64;
            if let Some(price) = product.price {
                if avg_savings > 0.0 {
                    let savings_percent = avg_savings / price * 100.0;
                    if savings_percent > 30.0 {
                        deduction += 3.5 * alternatives.len() as f64;
                    } else if savings_percent > 15.0 {
                        deduction += 1.8 * alternatives.len() as f64;
                    }
                }
            }
            score -= deduction;

            let rounded = round1(deduction);
            let savings_note = if avg_savings > 0.0 {
                format!(" (avg savings: ${:.2})", avg_savings)
            } else {
                String::new()
            };
            breakdown.push(format!(
                "-{:.1} points: {} cheaper alternative(s) available{}",
                rounded,
                alternatives.len(),
                savings_note
            ));

            let mut section = vec![
                format!("CHEAPER ALTERNATIVES FOUND ({:.1} points deducted):", rounded),
                format!(
                    "  Found {} cheaper or similar options that could save you money.",
                    alternatives.len()
                ),
            ];
            for alt in alternatives.iter().take(3) {
                if let Some(savings) = alt.savings.filter(|s| *s > 0.0) {
                    let percent = savings / product.price.unwrap_or(1.0) * 100.0;
                    section.push(format!(
                        "    - {}: Save ${:.2} ({:.1}% off)",
                        alt.description, savings, percent
                    ));
                }
            }
            narrative.push(section.join("\n"));
        }

        let over_budget = match (&prefs.budget_range, product.price) {
            (Some(range), Some(price)) if price > range.max => Some((range.max, price)),
            _ => None,
        };
        if let Some((max, price)) = over_budget {
            let overage = price - max;
            let overage_percent = overage / max * 100.0;

            let mut deduction = 18.5;
            if overage_percent > 50.0 {
                deduction += 4.5;
            } else if overage_percent > 25.0 {
                deduction += 2.3;
            }
            score -= deduction;

            let rounded = round1(deduction);
            breakdown.push(format!(
                "-{:.1} points: Price (${:.2}) exceeds your budget (${}) by ${:.2} ({:.1}%)",
                rounded, price, max, overage, overage_percent
            ));
            narrative.push(format!(
                "OVER BUDGET ({:.1} points deducted):\n  This product costs ${:.2}, which exceeds your budget of ${} by ${:.2}.",
                rounded, price, max, overage
            ));
        }

        if let Some(drop) = price_drop {
            if !drop.reasons.is_empty() {
                let mut section = vec![format!(
                    "PRICE DROP ANALYSIS ({} likelihood):",
                    drop.likelihood.to_string().to_uppercase()
                )];
                for reason in &drop.reasons {
                    section.push(format!("  • {}", reason));
                }
                section.push(format!(
                    "\n  RECOMMENDATION: {}",
                    match drop.likelihood {
                        Likelihood::High =>
                            "Consider waiting - prices are likely to drop soon due to the factors above.",
                        Likelihood::Medium =>
                            "Prices may drop in the near future. Consider waiting if you're not in urgent need.",
                        Likelihood::Low =>
                            "Price stability is expected, though minor discounts may occur.",
                    }
                ));
                narrative.push(section.join("\n"));
            }
        }

        let mut positive_factors = 0;

        if claims.is_empty() {
            score += 5.0;
            positive_factors += 1;
            breakdown.push("+5.0 points: No marketing manipulation tactics detected".to_string());
            narrative.push(
                [
                    "CLEAN PRODUCT INDICATORS:",
                    "  • No urgency/scarcity pressure detected",
                    "  • No fake exclusivity claims found",
                    "  • No aggressive impulse triggers identified",
                    "  • Marketing appears straightforward and honest",
                ]
                .join("\n"),
            );
        }

        if alternatives.is_empty() {
            score += 3.5;
            positive_factors += 1;
            breakdown.push(
                "+3.5 points: No cheaper alternatives found - current price appears competitive"
                    .to_string(),
            );
            narrative.push(
                [
                    "PRICE COMPETITIVENESS:",
                    "  • No cheaper alternatives detected in the market",
                    "  • Current price appears competitive",
                ]
                .join("\n"),
            );
        }

        let within_budget = match (&prefs.budget_range, product.price) {
            (Some(range), Some(price)) if price <= range.max => Some((range.max, price)),
            _ => None,
        };
        if let Some((max, price)) = within_budget {
            score += 4.0;
            positive_factors += 1;
            let remaining = max - price;
            breakdown.push(format!(
                "+4.0 points: Within your budget (${:.2} remaining)",
                remaining
            ));
            narrative.push(format!(
                "WITHIN BUDGET:\n  • Price (${:.2}) is within your budget (${})\n  • You have ${:.2} remaining in your budget",
                price, max, remaining
            ));
        }

        if positive_factors >= 3 {
            narrative.push(
                "MULTIPLE POSITIVE INDICATORS: This product shows good signs - honest marketing, competitive pricing, and fits your budget."
                    .to_string(),
            );
        }

        let score = clamp_score(score);
        let verdict = Verdict::from_score(score);

        let reasoning = match verdict {
            Verdict::Avoid => "STRONG RECOMMENDATION TO AVOID".to_string(),
            Verdict::FindAlternative => "CONSIDER ALTERNATIVES".to_string(),
            Verdict::Wait => "CONSIDER WAITING - Some concerns detected".to_string(),
            Verdict::Buy => {
                if score >= 85.0 {
                    "EXCELLENT PURCHASE - Strong recommendation to buy".to_string()
                } else {
                    "GOOD PURCHASE - Reasonable to buy".to_string()
                }
            }
        };

        let assessment = if score < 30.0 {
            "MULTIPLE RED FLAGS DETECTED: This product shows significant manipulation tactics, better alternatives exist, and waiting may save you money. Strong recommendation to avoid or find alternatives."
        } else if score < 50.0 {
            "HIGH RISK PURCHASE: Better alternatives are available, and price drops are likely. Consider waiting or choosing an alternative to save money."
        } else if score < 75.0 {
            "MODERATE CONCERNS: Some concerns detected. Take time to consider alternatives and potential price drops. Not urgent - waiting may benefit you."
        } else if score < 85.0 {
            "GOOD PURCHASE: No major red flags detected. This appears to be a reasonable purchase. As always, consider if you really need it, but there's no strong reason to avoid or wait."
        } else {
            "EXCELLENT PURCHASE: Clean product with honest marketing, competitive pricing, and no major concerns. Strong recommendation to proceed with purchase if you need this item."
        };

        let breakdown_block = if breakdown.is_empty() {
            "No adjustments applied".to_string()
        } else {
            breakdown.join("\n")
        };
        let detailed_reasoning = format!(
            "SCORE BREAKDOWN: {:.2}/100\n{}\n\n{}\n\n{}\n\nFINAL ASSESSMENT:\nFinal Score: {:.2}/100\n{}",
            score,
            breakdown_block,
            narrative.join("\n\n"),
            reasoning,
            score,
            assessment
        );

        Recommendation {
            score,
            reasoning,
            detailed_reasoning,
            verdict,
        }
    }
}

fn claim_is_debunked(claim: &ManipulationClaim) -> bool {
    claim.verified == Some(false)
        || claim
            .verification_evidence
            .as_deref()
            .is_some_and(|e| e.contains("misleading"))
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn likelihood_from_points(points: u32) -> Likelihood {
    if points >= 7 {
        Likelihood::High
    } else if points >= 4 {
        Likelihood::Medium
    } else {
        Likelihood::Low
    }
}

/// Seasonal discount signal for a zero-based month, with its point weight
fn seasonal_signal(month0: u32) -> Option<(String, u32)> {
    let name = MONTH_NAMES.get(month0 as usize)?;
    match month0 {
        9..=11 => Some((
            format!(
                "Holiday shopping season ({}) typically brings major sales - waiting 2-8 weeks may yield 20-40% discounts",
                name
            ),
            4,
        )),
        0 | 1 => Some((
            format!(
                "Post-holiday clearance period ({}) often has steep discounts as retailers clear inventory",
                name
            ),
            3,
        )),
        6..=8 => Some((
            format!(
                "Summer sales period ({}) often includes promotional pricing for electronics and popular items",
                name
            ),
            2,
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::types::BudgetRange;
    use pretty_assertions::assert_eq;

    fn scorer() -> RecommendationScorer {
        RecommendationScorer::new(None)
    }

    fn product(price: Option<f64>) -> ProductInfo {
        ProductInfo {
            url: "https://example.com/p/1".to_string(),
            title: "Ergonomic Chair".to_string(),
            description: String::new(),
            currency: price.map(|_| "USD".to_string()),
            price,
            brand: None,
        }
    }

    fn claim(claim_type: &str, verified: Option<bool>) -> ManipulationClaim {
        ManipulationClaim {
            claim_type: claim_type.to_string(),
            claim: "only 3 left".to_string(),
            found_text: "Only 3 Left".to_string(),
            verified,
            verification_evidence: None,
            cached: false,
        }
    }

    #[test]
    fn test_clean_product_scores_buy() {
        let rec = scorer().compose(
            &product(Some(100.0)),
            &[],
            &[],
            &UserPreferences::default(),
            None,
        );

        // 75 + 5 (no claims) + 3.5 (no alternatives)
        assert_eq!(rec.score, 83.5);
        assert_eq!(rec.verdict, Verdict::Buy);
        assert_eq!(rec.reasoning, "GOOD PURCHASE - Reasonable to buy");
    }

    #[test]
    fn test_excellent_wording_at_85() {
        let prefs = UserPreferences {
            budget_range: Some(BudgetRange { min: 0.0, max: 150.0 }),
            ..Default::default()
        };
        let rec = scorer().compose(&product(Some(100.0)), &[], &[], &prefs, None);

        // 75 + 5 + 3.5 + 4 (within budget)
        assert_eq!(rec.score, 87.5);
        assert!(rec.reasoning.starts_with("EXCELLENT PURCHASE"));
        assert!(rec.detailed_reasoning.contains("WITHIN BUDGET"));
    }

    #[test]
    fn test_debunked_urgency_claim_deduction() {
        let claims = vec![claim(claim_categories::URGENCY, Some(false))];
        let rec = scorer().compose(
            &product(Some(100.0)),
            &claims,
            &[],
            &UserPreferences::default(),
            None,
        );

        // 75 - (14.5 + 2.3 + 3.2) + 3.5 (no alternatives)
        assert_eq!(rec.score, 58.5);
        assert_eq!(rec.verdict, Verdict::Wait);
        assert!(rec
            .detailed_reasoning
            .contains("MARKETING CLAIMS DETECTED (20.0 points deducted)"));
    }

    #[test]
    fn test_never_verified_claim_skips_debunked_penalty() {
        // Detection-only mode (no search client): claims stay unverified
        // and only the base + severity deduction applies
        let claims = vec![claim(claim_categories::URGENCY, None)];
        let rec = scorer().compose(
            &product(Some(100.0)),
            &claims,
            &[],
            &UserPreferences::default(),
            None,
        );

        // 75 - (14.5 + 2.3) + 3.5 (no alternatives), no 3.2 debunked penalty
        assert_eq!(rec.score, 61.7);
        assert!(!rec
            .detailed_reasoning
            .contains("appears to be a marketing tactic"));
    }

    #[test]
    fn test_alternatives_with_large_savings() {
        let alternatives = vec![
            Alternative {
                kind: crate::analysis::types::AlternativeKind::Used,
                description: "Used chair".to_string(),
                url: Some("https://ebay.com/itm/1".to_string()),
                price: Some(60.0),
                savings: Some(40.0),
            },
            Alternative {
                kind: crate::analysis::types::AlternativeKind::Alternative,
                description: "Generic chair".to_string(),
                url: Some("https://ebay.com/itm/2".to_string()),
                price: Some(60.0),
                savings: Some(40.0),
            },
        ];
        let rec = scorer().compose(
            &product(Some(100.0)),
            &[],
            &alternatives,
            &UserPreferences::default(),
            None,
        );

        // avg savings 40 = 40% of price, so (9.5 + 3.5) per alternative.
        // 75 - 26 + 5 (no claims)
        assert_eq!(rec.score, 54.0);
        assert!(rec.detailed_reasoning.contains("avg savings: $40.00"));
        assert!(rec.detailed_reasoning.contains("Save $40.00 (40.0% off)"));
    }

    #[test]
    fn test_savings_tier_boundary_is_strict() {
        let alt = |savings: f64| Alternative {
            kind: crate::analysis::types::AlternativeKind::Used,
            description: "Used chair".to_string(),
            url: Some("https://ebay.com/itm/1".to_string()),
            price: Some(100.0 - savings),
            savings: Some(savings),
        };

        // Savings of $20 and $40 on a $100 item average exactly 30%,
        // which lands in the middle tier (strict > 30 comparison)
        let rec = scorer().compose(
            &product(Some(100.0)),
            &[],
            &[alt(20.0), alt(40.0)],
            &UserPreferences::default(),
            None,
        );
        // 75 - (9.5 + 1.8) * 2 + 5 (no claims)
        assert_eq!(rec.score, 57.4);
        assert!(rec.detailed_reasoning.contains("avg savings: $30.00"));

        // A 31% average crosses into the top tier
        let rec = scorer().compose(
            &product(Some(100.0)),
            &[],
            &[alt(20.0), alt(42.0)],
            &UserPreferences::default(),
            None,
        );
        // 75 - (9.5 + 3.5) * 2 + 5 (no claims)
        assert_eq!(rec.score, 54.0);
    }

    #[test]
    fn test_far_over_budget_deduction() {
        let prefs = UserPreferences {
            budget_range: Some(BudgetRange { min: 0.0, max: 100.0 }),
            ..Default::default()
        };
        let rec = scorer().compose(&product(Some(200.0)), &[], &[], &prefs, None);

        // 75 - (18.5 + 4.5) + 5 + 3.5
        assert_eq!(rec.score, 60.5);
        assert!(rec.detailed_reasoning.contains("exceeds your budget ($100)"));
    }

    #[test]
    fn test_high_price_drop_likelihood_deduction() {
        let drop = PriceDropAnalysis {
            likelihood: Likelihood::High,
            reasons: vec!["New version or refresh may be coming soon".to_string()],
        };
        let rec = scorer().compose(
            &product(Some(100.0)),
            &[],
            &[],
            &UserPreferences::default(),
            Some(&drop),
        );

        // 75 - 12.5 + 5 + 3.5
        assert_eq!(rec.score, 71.0);
        assert_eq!(rec.verdict, Verdict::Wait);
        assert!(rec
            .detailed_reasoning
            .contains("PRICE DROP ANALYSIS (HIGH likelihood)"));
    }

    #[test]
    fn test_heavy_manipulation_scores_avoid() {
        let claims = vec![
            claim(claim_categories::URGENCY, Some(false)),
            claim(claim_categories::PRICING, Some(false)),
            claim(claim_categories::EXCLUSIVITY, Some(false)),
        ];
        let rec = scorer().compose(
            &product(Some(100.0)),
            &claims,
            &[],
            &UserPreferences::default(),
            None,
        );

        assert!(rec.score < 30.0);
        assert_eq!(rec.verdict, Verdict::Avoid);
        assert_eq!(rec.reasoning, "STRONG RECOMMENDATION TO AVOID");
    }

    #[test]
    fn test_likelihood_thresholds() {
        assert_eq!(likelihood_from_points(7), Likelihood::High);
        assert_eq!(likelihood_from_points(10), Likelihood::High);
        assert_eq!(likelihood_from_points(4), Likelihood::Medium);
        assert_eq!(likelihood_from_points(3), Likelihood::Low);
        assert_eq!(likelihood_from_points(0), Likelihood::Low);
    }

    #[test]
    fn test_seasonal_signal_windows() {
        let (holiday, points) = seasonal_signal(10).unwrap();
        assert!(holiday.contains("november"));
        assert_eq!(points, 4);

        let (clearance, points) = seasonal_signal(0).unwrap();
        assert!(clearance.contains("january"));
        assert_eq!(points, 3);

        let (summer, points) = seasonal_signal(7).unwrap();
        assert!(summer.contains("august"));
        assert_eq!(points, 2);

        assert!(seasonal_signal(3).is_none());
        assert!(seasonal_signal(12).is_none());
    }

    #[test]
    fn test_breakdown_falls_back_when_empty() {
        let alternatives = vec![Alternative {
            kind: crate::analysis::types::AlternativeKind::Alternative,
            description: "Other".to_string(),
            url: None,
            price: None,
            savings: None,
        }];
        let claims = vec![claim(claim_categories::REVIEWS, None)];
        let rec = scorer().compose(
            &product(None),
            &claims,
            &alternatives,
            &UserPreferences::default(),
            None,
        );

        // 75 - 14.5 - 9.5, no bonuses apply
        assert_eq!(rec.score, 51.0);
        assert!(rec.detailed_reasoning.starts_with("SCORE BREAKDOWN: 51.00/100"));
    }
}
