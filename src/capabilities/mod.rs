// src/capabilities/mod.rs
//! Capability probe: acquires the optional enrichment features once at startup
//! and hands back an immutable `Capabilities` value that scoring code queries
//! by name. Each acquisition is isolated; a failing one only leaves its own
//! slot empty.

pub mod embedding;
pub mod lexicon;
pub mod similarity;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::config::{CapabilitiesConfig, EmbeddingProvider, SimilarityKind};
use crate::error::Result;

pub use embedding::{Embedder, HashingEmbedder, OpenAiEmbedder};
pub use lexicon::{LexiconSentiment, SentimentModel};
pub use similarity::{CosineSimilarity, VectorSimilarity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Embedding,
    Similarity,
    SentimentLexicon,
}

impl Capability {
    pub fn as_str(self) -> &'static str {
        match self {
            Capability::Embedding => "embedding",
            Capability::Similarity => "similarity",
            Capability::SentimentLexicon => "sentiment_lexicon",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The set of enrichment features available to this process.
#[derive(Clone, Default)]
pub struct Capabilities {
    embedder: Option<Arc<dyn Embedder>>,
    similarity: Option<Arc<dyn VectorSimilarity>>,
    sentiment: Option<Arc<dyn SentimentModel>>,
}

impl Capabilities {
    /// Empty set: every scorer runs its deterministic fallback.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_embedder(mut self, e: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(e);
        self
    }

    pub fn with_similarity(mut self, s: Arc<dyn VectorSimilarity>) -> Self {
        self.similarity = Some(s);
        self
    }

    pub fn with_sentiment(mut self, s: Arc<dyn SentimentModel>) -> Self {
        self.sentiment = Some(s);
        self
    }

    pub fn has(&self, c: Capability) -> bool {
        match c {
            Capability::Embedding => self.embedder.is_some(),
            Capability::Similarity => self.similarity.is_some(),
            Capability::SentimentLexicon => self.sentiment.is_some(),
        }
    }

    pub fn available(&self) -> BTreeSet<Capability> {
        [
            Capability::Embedding,
            Capability::Similarity,
            Capability::SentimentLexicon,
        ]
        .into_iter()
        .filter(|c| self.has(*c))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.available().is_empty()
    }

    pub fn embedder(&self) -> Option<&dyn Embedder> {
        self.embedder.as_deref()
    }

    pub fn similarity(&self) -> Option<&dyn VectorSimilarity> {
        self.similarity.as_deref()
    }

    pub fn sentiment(&self) -> Option<&dyn SentimentModel> {
        self.sentiment.as_deref()
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capabilities")
            .field("embedder", &self.embedder.as_ref().map(|e| e.name()))
            .field("similarity", &self.similarity.as_ref().map(|s| s.name()))
            .field("sentiment", &self.sentiment.as_ref().map(|s| s.name()))
            .finish()
    }
}

/// Attempt every acquisition independently. Never fails.
pub async fn probe(cfg: &CapabilitiesConfig) -> Capabilities {
    let mut caps = Capabilities::none();

    match acquire_embedder(cfg).await {
        Ok(Some(e)) => {
            info!(target: "capabilities", provider = e.name(), "embedding model acquired");
            caps.embedder = Some(e);
        }
        Ok(None) => info!(target: "capabilities", "embedding model not configured"),
        Err(e) => warn!(target: "capabilities", error = %e, "embedding model unavailable"),
    }

    match acquire_similarity(cfg) {
        Ok(Some(s)) => {
            info!(target: "capabilities", routine = s.name(), "similarity routine acquired");
            caps.similarity = Some(s);
        }
        Ok(None) => info!(target: "capabilities", "similarity routine not configured"),
        Err(e) => warn!(target: "capabilities", error = %e, "similarity routine unavailable"),
    }

    match acquire_sentiment(cfg) {
        Ok(Some(s)) => {
            info!(target: "capabilities", model = s.name(), "sentiment lexicon acquired");
            caps.sentiment = Some(s);
        }
        Ok(None) => info!(target: "capabilities", "sentiment lexicon not configured"),
        Err(e) => warn!(target: "capabilities", error = %e, "sentiment lexicon unavailable"),
    }

    info!(
        target: "capabilities",
        available = ?caps.available().iter().map(|c| c.as_str()).collect::<Vec<_>>(),
        "capability probe finished"
    );
    caps
}

/// Process-wide probe result; the first caller's config wins.
pub async fn process_capabilities(cfg: &CapabilitiesConfig) -> &'static Capabilities {
    static PROBED: OnceCell<Capabilities> = OnceCell::const_new();
    PROBED.get_or_init(|| probe(cfg)).await
}

async fn acquire_embedder(cfg: &CapabilitiesConfig) -> Result<Option<Arc<dyn Embedder>>> {
    match cfg.embedding {
        EmbeddingProvider::None => Ok(None),
        EmbeddingProvider::Hashing => Ok(Some(Arc::new(HashingEmbedder::new(
            cfg.embedding_dimensions,
        )))),
        EmbeddingProvider::OpenAi => {
            let key = std::env::var("OPENAI_API_KEY").unwrap_or_default();
            let e = OpenAiEmbedder::new(key, &cfg.embedding_model, &cfg.embedding_api_url)?;
            // one real call so a bad key/model shows up here, not per record
            e.embed("capability probe").await?;
            Ok(Some(Arc::new(e)))
        }
    }
}

fn acquire_similarity(cfg: &CapabilitiesConfig) -> Result<Option<Arc<dyn VectorSimilarity>>> {
    match cfg.similarity {
        SimilarityKind::None => Ok(None),
        SimilarityKind::Cosine => {
            let s = CosineSimilarity;
            similarity::self_check(&s)?;
            Ok(Some(Arc::new(s)))
        }
    }
}

fn acquire_sentiment(cfg: &CapabilitiesConfig) -> Result<Option<Arc<dyn SentimentModel>>> {
    match cfg.sentiment_lexicon.as_deref() {
        None => Ok(None),
        Some(path) => Ok(Some(Arc::new(LexiconSentiment::from_path(path)?))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[tokio::test]
    async fn failures_are_isolated() {
        let cfg = CapabilitiesConfig {
            embedding: EmbeddingProvider::Hashing,
            similarity: SimilarityKind::Cosine,
            sentiment_lexicon: Some(PathBuf::from("/no/such/lexicon.json")),
            ..Default::default()
        };
        let caps = probe(&cfg).await;
        assert!(caps.has(Capability::Embedding));
        assert!(caps.has(Capability::Similarity));
        assert!(!caps.has(Capability::SentimentLexicon));
    }

    #[tokio::test]
    async fn nothing_configured_is_empty() {
        let cfg = CapabilitiesConfig {
            embedding: EmbeddingProvider::None,
            similarity: SimilarityKind::None,
            sentiment_lexicon: None,
            ..Default::default()
        };
        let caps = probe(&cfg).await;
        assert!(caps.is_empty());
        assert!(caps.available().is_empty());
    }

    #[tokio::test]
    async fn lexicon_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("lex.json");
        std::fs::write(&p, r#"{"fast": 2.0, "slow": -2.0}"#).unwrap();
        let cfg = CapabilitiesConfig {
            embedding: EmbeddingProvider::None,
            similarity: SimilarityKind::None,
            sentiment_lexicon: Some(p),
            ..Default::default()
        };
        let caps = probe(&cfg).await;
        assert_eq!(
            caps.available().into_iter().collect::<Vec<_>>(),
            vec![Capability::SentimentLexicon]
        );
    }
}
