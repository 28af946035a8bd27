//! Keyword-based input classification.
//!
//! Matching is plain substring containment on lowercased text, so "badge"
//! counts as negative and "kindle" counts as positive. Both checks are
//! independent: a message can be positive and negative at the same time.

use serde::Serialize;

/// Keywords that relieve stress and protect a memory from eviction.
pub const POSITIVE_CORE: &[&str] = &["thank", "thanks", "appreciate", "good", "nice", "kind"];

/// Keywords that add stress.
pub const NEGATIVE_KEYWORDS: &[&str] = &["angry", "tired", "hate", "annoy", "bad"];

/// Result of classifying one input text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub positive: bool,
    pub negative: bool,
}

impl Classification {
    /// Neither positive nor negative.
    pub fn is_neutral(&self) -> bool {
        !self.positive && !self.negative
    }
}

/// Classify raw (not yet lowercased) text.
pub fn classify(text: &str) -> Classification {
    let lower = text.to_lowercase();
    Classification {
        positive: contains_any(&lower, POSITIVE_CORE),
        negative: contains_any(&lower, NEGATIVE_KEYWORDS),
    }
}

/// True iff the text contains a positive-core keyword, ignoring case.
pub fn is_positive(text: &str) -> bool {
    contains_any(&text.to_lowercase(), POSITIVE_CORE)
}

/// True iff the text contains a negative keyword, ignoring case.
pub fn is_negative(text: &str) -> bool {
    contains_any(&text.to_lowercase(), NEGATIVE_KEYWORDS)
}

fn contains_any(lower: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| lower.contains(k))
}
