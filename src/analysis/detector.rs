use regex::Regex;

use super::types::{claim_categories, ManipulationClaim};

/// Output of a detection pass: parallel category names and claims
#[derive(Debug, Clone, Default)]
pub struct Detection {
    pub signals: Vec<String>,
    pub claims: Vec<ManipulationClaim>,
}

/// Detects known deceptive-marketing phrases in listing text.
///
/// Pure and synchronous. Each category carries two alternative phrase
/// patterns; the first pattern that matches records one claim for the
/// category and short-circuits it, so a category never produces more
/// than one claim no matter how many phrases match.
pub struct ClaimDetector {
    matchers: Vec<CategoryMatcher>,
}

struct CategoryMatcher {
    category: &'static str,
    patterns: Vec<Regex>,
}

impl ClaimDetector {
    /// Compile the category matchers
    pub fn new() -> Self {
        let compile = |patterns: &[&str]| -> Vec<Regex> {
            patterns
                .iter()
                .map(|p| Regex::new(p).expect("claim pattern is a valid regex"))
                .collect()
        };

        let matchers = vec![
            CategoryMatcher {
                category: claim_categories::URGENCY,
                patterns: compile(&[
                    r"(?i)\b(limited time|act now|only \d+ left|hurry|expires|countdown|ending soon)\b",
                    r"(?i)\b(only \d+ in stock|almost gone|selling fast|last chance)\b",
                ]),
            },
            CategoryMatcher {
                category: claim_categories::EXCLUSIVITY,
                patterns: compile(&[
                    r"(?i)\b(one-time offer|never again|exclusive deal|members only)\b",
                    r"(?i)\b(exclusive|limited edition|special offer|once in a lifetime)\b",
                ]),
            },
            CategoryMatcher {
                category: claim_categories::IMPULSE,
                patterns: compile(&[
                    r"(?i)\b(buy now|order today|don't miss out|deal of the day)\b",
                    r"(?i)\b(flash sale|today only|instant savings)\b",
                ]),
            },
            CategoryMatcher {
                category: claim_categories::REVIEWS,
                patterns: compile(&[
                    r"(?i)\b(trusted by millions|5-star rated|best seller)\b",
                    r"(?i)\b(\d+% satisfied|thousands of reviews|award winning)\b",
                ]),
            },
            CategoryMatcher {
                category: claim_categories::PRICING,
                patterns: compile(&[
                    r"(?i)\b(was \$[\d,]+\.?\d* now \$[\d,]+\.?\d*|save \d+%|discount|markdown)\b",
                    r"(?i)\b(original price|compare at|list price|you save)\b",
                ]),
            },
        ];

        Self { matchers }
    }

    /// Scan title + description for manipulative phrases
    pub fn detect(&self, title: &str, description: &str) -> Detection {
        let text = format!("{} {}", description, title);
        let mut detection = Detection::default();

        for matcher in &self.matchers {
            for pattern in &matcher.patterns {
                if let Some(found) = pattern.find(&text) {
                    let phrase = found.as_str().to_string();
                    detection.signals.push(matcher.category.to_string());
                    detection.claims.push(ManipulationClaim {
                        claim_type: matcher.category.to_string(),
                        claim: phrase.clone(),
                        found_text: phrase,
                        verified: None,
                        verification_evidence: None,
                        cached: false,
                    });
                    break;
                }
            }
        }

        detection
    }
}

impl Default for ClaimDetector {
    fn default() -> Self {
        Self::new()
    }
}
