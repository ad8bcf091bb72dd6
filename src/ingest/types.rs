// src/ingest/types.rs
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;

pub const NEUTRAL_SENTIMENT: f32 = 0.0;
pub const NEUTRAL_RELEVANCE: f32 = 0.5;

/// The four adoption tiers. Ordering follows display order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Adopt,
    Trial,
    #[default]
    Assess,
    Avoid,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::Adopt, Tier::Trial, Tier::Assess, Tier::Avoid];

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Adopt => "adopt",
            Tier::Trial => "trial",
            Tier::Assess => "assess",
            Tier::Avoid => "avoid",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Tier::Adopt => "Adopt",
            Tier::Trial => "Trial",
            Tier::Assess => "Assess",
            Tier::Avoid => "Avoid",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Which upstream produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    #[serde(rename = "github")]
    GitHub,
    #[serde(rename = "stackoverflow")]
    StackOverflow,
}

/// Source-specific popularity numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Popularity {
    Repository { stars: u64, forks: u64 },
    Tag { questions: u64 },
}

/// One observed technology signal. `name` is the key within a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendRecord {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub language: Option<String>,
    pub source: SourceKind,
    pub popularity: Popularity,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub category: Tier,
    #[serde(default)]
    pub sentiment_score: f32,
    #[serde(default = "neutral_relevance")]
    pub relevance_score: f32,
}

fn neutral_relevance() -> f32 {
    NEUTRAL_RELEVANCE
}

impl TrendRecord {
    /// New record with enrichment fields at their pending defaults.
    pub fn new(name: impl Into<String>, source: SourceKind, popularity: Popularity) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            language: None,
            source,
            popularity,
            url: None,
            full_name: None,
            topics: Vec::new(),
            created_at: None,
            updated_at: None,
            category: Tier::Assess,
            sentiment_score: NEUTRAL_SENTIMENT,
            relevance_score: NEUTRAL_RELEVANCE,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// `name description language`, the text used for tier classification.
    pub fn classification_text(&self) -> String {
        format!(
            "{} {} {}",
            self.name,
            self.description,
            self.language.as_deref().unwrap_or_default()
        )
    }

    /// `name description`, the text used for sentiment and relevance.
    pub fn summary_text(&self) -> String {
        format!("{} {}", self.name, self.description)
    }

    /// Pull scores back into range; non-finite values become the neutral midpoint.
    pub fn clamp_scores(&mut self) {
        self.sentiment_score = clamp_or(self.sentiment_score, -1.0, 1.0, NEUTRAL_SENTIMENT);
        self.relevance_score = clamp_or(self.relevance_score, 0.0, 1.0, NEUTRAL_RELEVANCE);
    }
}

pub(crate) fn clamp_or(v: f32, lo: f32, hi: f32, fallback: f32) -> f32 {
    if v.is_finite() {
        v.clamp(lo, hi)
    } else {
        fallback
    }
}

/// An upstream collector of trend records.
///
/// Implementations report failures as `Err`; the ingest loop turns those into
/// an empty contribution so one bad source never sinks the run.
#[async_trait]
pub trait TrendSource: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<TrendRecord>>;
    fn name(&self) -> &'static str;
}
