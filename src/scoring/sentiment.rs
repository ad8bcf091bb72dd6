//! Keyword sentiment fallback.

pub const POSITIVE_WORDS: &[&str] = &[
    "fast",
    "efficient",
    "powerful",
    "modern",
    "secure",
    "scalable",
    "reliable",
];

pub const NEGATIVE_WORDS: &[&str] = &[
    "slow",
    "buggy",
    "deprecated",
    "outdated",
    "vulnerable",
    "broken",
];

/// (positive - negative) / (positive + negative) over words present in the
/// lower-cased text; 0.0 when neither list matches.
pub fn keyword_polarity(text: &str) -> f32 {
    let lower = text.to_lowercase();
    let pos = POSITIVE_WORDS.iter().filter(|w| lower.contains(*w)).count() as f32;
    let neg = NEGATIVE_WORDS.iter().filter(|w| lower.contains(*w)).count() as f32;
    let total = pos + neg;
    if total == 0.0 {
        return 0.0;
    }
    (pos - neg) / total
}
