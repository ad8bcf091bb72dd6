// src/config/schema.rs
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::ingest::types::Tier;

pub const DEFAULT_UPDATE_FREQUENCY_DAYS: i64 = 1;
/// Ten years; anything longer is treated as a typo.
pub const MAX_UPDATE_FREQUENCY_DAYS: i64 = 3650;
pub const DEFAULT_MIN_CHANGES: usize = 3;
pub const DEFAULT_CHANGE_THRESHOLD_PCT: f64 = 5.0;

/// Top-level configuration. Every key is optional; the first three keep the
/// names used by the existing `tech_radar_config.json` files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RadarConfig {
    pub update_frequency_days: i64,
    pub min_changes_for_update: usize,
    pub change_threshold_percentage: f64,
    /// interest category -> free-text interest phrases
    pub your_interests: BTreeMap<String, Vec<String>>,
    pub sources: SourcesConfig,
    pub capabilities: CapabilitiesConfig,
    pub paths: PathsConfig,
    pub publish: PublishConfig,
    pub baseline: BaselineConfig,
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self {
            update_frequency_days: DEFAULT_UPDATE_FREQUENCY_DAYS,
            min_changes_for_update: DEFAULT_MIN_CHANGES,
            change_threshold_percentage: DEFAULT_CHANGE_THRESHOLD_PCT,
            your_interests: BTreeMap::new(),
            sources: SourcesConfig::default(),
            capabilities: CapabilitiesConfig::default(),
            paths: PathsConfig::default(),
            publish: PublishConfig::default(),
            baseline: BaselineConfig::default(),
        }
    }
}

impl RadarConfig {
    /// Flattened interest phrases in category order, blanks dropped.
    pub fn interest_phrases(&self) -> Vec<String> {
        self.your_interests
            .values()
            .flatten()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Replace out-of-range values with their defaults.
    pub(crate) fn sanitize(mut self) -> Self {
        if !(0..=MAX_UPDATE_FREQUENCY_DAYS).contains(&self.update_frequency_days) {
            self.update_frequency_days = DEFAULT_UPDATE_FREQUENCY_DAYS;
        }
        if !self.change_threshold_percentage.is_finite() || self.change_threshold_percentage < 0.0
        {
            self.change_threshold_percentage = DEFAULT_CHANGE_THRESHOLD_PCT;
        }
        if self.sources.github_page_size == 0 || self.sources.github_page_size > 100 {
            self.sources.github_page_size = SourcesConfig::default().github_page_size;
        }
        if self.sources.stackoverflow_page_size == 0 || self.sources.stackoverflow_page_size > 100
        {
            self.sources.stackoverflow_page_size = SourcesConfig::default().stackoverflow_page_size;
        }
        if self.sources.timeout_secs == 0 {
            self.sources.timeout_secs = SourcesConfig::default().timeout_secs;
        }
        if self.capabilities.embedding_dimensions == 0 {
            self.capabilities.embedding_dimensions =
                CapabilitiesConfig::default().embedding_dimensions;
        }
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub github_api_url: String,
    pub github_query: String,
    pub github_page_size: u32,
    pub stackexchange_api_url: String,
    pub stackoverflow_page_size: u32,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            github_api_url: "https://api.github.com".to_string(),
            github_query: "created:>2024-01-01 stars:>100".to_string(),
            github_page_size: 100,
            stackexchange_api_url: "https://api.stackexchange.com/2.3".to_string(),
            stackoverflow_page_size: 50,
            timeout_secs: 15,
            user_agent: "tech-radar-updater/0.1".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    #[default]
    None,
    Hashing,
    OpenAi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityKind {
    #[default]
    Cosine,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CapabilitiesConfig {
    pub embedding: EmbeddingProvider,
    pub embedding_dimensions: usize,
    pub embedding_model: String,
    pub embedding_api_url: String,
    pub similarity: SimilarityKind,
    /// JSON word -> valence file; capability is absent when the file is missing.
    pub sentiment_lexicon: Option<PathBuf>,
}

impl Default for CapabilitiesConfig {
    fn default() -> Self {
        Self {
            embedding: EmbeddingProvider::None,
            embedding_dimensions: 256,
            embedding_model: "text-embedding-3-small".to_string(),
            embedding_api_url: "https://api.openai.com/v1/embeddings".to_string(),
            similarity: SimilarityKind::Cosine,
            sentiment_lexicon: Some(PathBuf::from("config/sentiment_lexicon.json")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub readme: PathBuf,
    pub snapshot: PathBuf,
    pub now_next: PathBuf,
    pub metrics_textfile: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            readme: PathBuf::from("README.md"),
            snapshot: PathBuf::from("data/tech_trends.json"),
            now_next: PathBuf::from("data/now.json"),
            metrics_textfile: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    pub radar_start: String,
    pub radar_end: String,
    pub now_next_start: String,
    pub now_next_end: String,
    pub heading: String,
    pub subtitle: String,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            radar_start: "<!-- TECH_RADAR:START -->".to_string(),
            radar_end: "<!-- TECH_RADAR:END -->".to_string(),
            now_next_start: "<!-- NOW_NEXT:START -->".to_string(),
            now_next_end: "<!-- NOW_NEXT:END -->".to_string(),
            heading: "### Tech Radar 🤖".to_string(),
            subtitle: "*AI-enhanced categorization updated every 2 weeks*".to_string(),
        }
    }
}

/// Hand-curated entries per tier, already in display form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BaselineConfig {
    pub adopt: Vec<String>,
    pub trial: Vec<String>,
    pub assess: Vec<String>,
    pub avoid: Vec<String>,
}

impl BaselineConfig {
    pub fn for_tier(&self, tier: Tier) -> &[String] {
        match tier {
            Tier::Adopt => &self.adopt,
            Tier::Trial => &self.trial,
            Tier::Assess => &self.assess,
            Tier::Avoid => &self.avoid,
        }
    }
}

impl Default for BaselineConfig {
    fn default() -> Self {
        fn v(items: &[&str]) -> Vec<String> {
            items.iter().map(|s| s.to_string()).collect()
        }
        Self {
            adopt: v(&[
                "**FastAPI**",
                "**Terraform**",
                "**AWS Lambda/ECS**",
                "**Amazon Kendra** for enterprise search",
                "**Bedrock** for managed LLM access",
            ]),
            trial: v(&[
                "**LangGraph** for multi-step agents",
                "**LiteLLM** as an LLM router",
                "**Guardrails / JSON schema validation** for LLM outputs",
            ]),
            assess: v(&[
                "**LoRA adapters** for small domain adapts",
                "**Vector DBs**: Weaviate vs. Chroma for small workloads",
                "**RAG triage** (FAQ vs. open-ended vs. CRM)",
            ]),
            avoid: v(&[
                "Direct **DB writes via LLM**",
                "Unbounded **function calling** without budget/guardrails",
            ]),
        }
    }
}
