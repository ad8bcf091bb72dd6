//! Tier classification.
//!
//! Keyword path: count which tier keywords appear in the lower-cased
//! `name description language` text; the strictly highest count wins,
//! ties and all-zero fall to Assess. Pure and deterministic.
//!
//! Embedding path: compare the record against one prototype phrase per tier.

use crate::capabilities::{Embedder, VectorSimilarity};
use crate::error::Result;
use crate::ingest::types::{TrendRecord, Tier};
use crate::scoring::text::jaccard;

pub const ADOPT_KEYWORDS: &[&str] = &[
    "production",
    "stable",
    "mature",
    "enterprise",
    "production-ready",
    "battle-tested",
    "widely-adopted",
    "industry-standard",
];

pub const TRIAL_KEYWORDS: &[&str] = &[
    "experimental",
    "beta",
    "alpha",
    "new",
    "innovative",
    "promising",
    "cutting-edge",
    "next-generation",
    "revolutionary",
];

pub const ASSESS_KEYWORDS: &[&str] = &[
    "monitoring",
    "evaluating",
    "considering",
    "potential",
    "emerging",
    "trending",
    "growing",
    "developing",
];

pub const AVOID_KEYWORDS: &[&str] = &[
    "deprecated",
    "outdated",
    "legacy",
    "security-issue",
    "performance-problem",
    "abandoned",
    "discontinued",
    "vulnerable",
];

/// Canonical description per tier, compared against record embeddings.
pub const TIER_PROTOTYPES: [(Tier, &str); 4] = [
    (
        Tier::Adopt,
        "production ready mature widely adopted stable enterprise",
    ),
    (Tier::Trial, "experimental promising new innovative beta"),
    (Tier::Assess, "monitoring evaluating considering potential"),
    (
        Tier::Avoid,
        "deprecated outdated security issues performance problems",
    ),
];

pub fn keywords_for(tier: Tier) -> &'static [&'static str] {
    match tier {
        Tier::Adopt => ADOPT_KEYWORDS,
        Tier::Trial => TRIAL_KEYWORDS,
        Tier::Assess => ASSESS_KEYWORDS,
        Tier::Avoid => AVOID_KEYWORDS,
    }
}

/// Number of distinct tier keywords present (substring match) per tier.
pub fn keyword_counts(text: &str) -> [(Tier, usize); 4] {
    let lower = text.to_lowercase();
    Tier::ALL.map(|tier| {
        let n = keywords_for(tier)
            .iter()
            .filter(|k| lower.contains(*k))
            .count();
        (tier, n)
    })
}

pub fn categorize_text_by_keywords(text: &str) -> Tier {
    let counts = keyword_counts(text).map(|(t, n)| (t, n as f32));
    pick_strict_max(&counts).unwrap_or(Tier::Assess)
}

pub fn categorize_by_keywords(record: &TrendRecord) -> Tier {
    categorize_text_by_keywords(&record.classification_text())
}

/// The tier with the strictly highest positive score; `None` on a tie at the top
/// or when nothing scored above zero.
pub(crate) fn pick_strict_max(scores: &[(Tier, f32)]) -> Option<Tier> {
    let mut best: Option<(Tier, f32)> = None;
    let mut tied = false;
    for &(tier, s) in scores {
        if !s.is_finite() {
            continue;
        }
        match best {
            None => best = Some((tier, s)),
            Some((_, b)) if s > b => {
                best = Some((tier, s));
                tied = false;
            }
            Some((_, b)) if s == b => tied = true,
            _ => {}
        }
    }
    match best {
        Some((tier, s)) if !tied && s > 0.0 => Some(tier),
        _ => None,
    }
}

/// Cosine path: embed the record text and compare with the prepared prototype vectors.
pub async fn categorize_by_embedding(
    embedder: &dyn Embedder,
    similarity: &dyn VectorSimilarity,
    text: &str,
    prototypes: &[(Tier, Vec<f32>)],
) -> Result<Option<Tier>> {
    let v = embedder.embed(text).await?;
    let mut scores = Vec::with_capacity(prototypes.len());
    for (tier, proto) in prototypes {
        scores.push((*tier, similarity.similarity(&v, proto)?));
    }
    Ok(pick_strict_max(&scores))
}

/// Lexical path for when an embedder exists without a similarity routine.
pub fn categorize_by_overlap(text: &str) -> Option<Tier> {
    let scores = TIER_PROTOTYPES.map(|(tier, phrase)| (tier, jaccard(text, phrase)));
    pick_strict_max(&scores)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adopt_keywords_win() {
        let counts = keyword_counts("production stable mature enterprise platform");
        assert_eq!(counts[0], (Tier::Adopt, 4));
        assert!(counts[1..].iter().all(|(_, n)| *n == 0));
        assert_eq!(
            categorize_text_by_keywords("production stable mature enterprise platform"),
            Tier::Adopt
        );
    }

    #[test]
    fn no_keywords_defaults_to_assess() {
        assert_eq!(categorize_text_by_keywords("xyz qqq"), Tier::Assess);
        assert_eq!(categorize_text_by_keywords(""), Tier::Assess);
    }

    #[test]
    fn tie_defaults_to_assess() {
        // one trial keyword, one avoid keyword
        assert_eq!(
            categorize_text_by_keywords("experimental legacy bridge"),
            Tier::Assess
        );
    }

    #[test]
    fn avoid_wins_when_strictly_highest() {
        assert_eq!(
            categorize_text_by_keywords("Deprecated and abandoned legacy toolkit (beta)"),
            Tier::Avoid
        );
    }

    #[test]
    fn language_participates() {
        let rec = TrendRecord::new(
            "x",
            crate::ingest::types::SourceKind::GitHub,
            crate::ingest::types::Popularity::Tag { questions: 0 },
        )
        .with_language("Experimental-lang");
        assert_eq!(categorize_by_keywords(&rec), Tier::Trial);
    }

    #[test]
    fn overlap_picks_closest_prototype() {
        assert_eq!(
            categorize_by_overlap("deprecated outdated library"),
            Some(Tier::Avoid)
        );
        assert_eq!(categorize_by_overlap("graph database"), None);
    }

    #[test]
    fn strict_max_rules() {
        assert_eq!(
            pick_strict_max(&[(Tier::Adopt, 0.2), (Tier::Trial, 0.5)]),
            Some(Tier::Trial)
        );
        assert_eq!(
            pick_strict_max(&[(Tier::Adopt, 0.5), (Tier::Trial, 0.5)]),
            None
        );
        assert_eq!(
            pick_strict_max(&[(Tier::Adopt, 0.0), (Tier::Trial, 0.0)]),
            None
        );
        assert_eq!(
            pick_strict_max(&[(Tier::Adopt, f32::NAN), (Tier::Avoid, 0.1)]),
            Some(Tier::Avoid)
        );
    }
}
