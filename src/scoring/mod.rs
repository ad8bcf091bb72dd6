// src/scoring/mod.rs
//! Per-record enrichment: tier, sentiment and relevance.
//!
//! Each scorer branches on capability presence only. Any enrichment error is
//! logged and that single field falls back to its keyword/overlap heuristic.

pub mod category;
pub mod relevance;
pub mod sentiment;
pub mod text;

use metrics::counter;
use tracing::{debug, warn};

use crate::capabilities::{Capabilities, Capability};
use crate::ingest::types::{clamp_or, Tier, TrendRecord, NEUTRAL_RELEVANCE, NEUTRAL_SENTIMENT};

use self::category::TIER_PROTOTYPES;

/// Scoring context for one run: capabilities plus vectors prepared up front
/// (tier prototypes, interest phrases) so they are embedded once, not per record.
pub struct Scorer {
    caps: Capabilities,
    interests: Vec<String>,
    tier_vectors: Option<Vec<(Tier, Vec<f32>)>>,
    interest_vectors: Option<Vec<Vec<f32>>>,
}

impl Scorer {
    pub async fn prepare(caps: Capabilities, interests: Vec<String>) -> Self {
        let mut tier_vectors = None;
        let mut interest_vectors = None;

        if let (Some(embedder), Some(_)) = (caps.embedder(), caps.similarity()) {
            let mut protos = Vec::with_capacity(TIER_PROTOTYPES.len());
            let mut ok = true;
            for (tier, phrase) in TIER_PROTOTYPES {
                match embedder.embed(phrase).await {
                    Ok(v) => protos.push((tier, v)),
                    Err(e) => {
                        warn!(target: "scoring", error = %e, "tier prototype embedding failed");
                        ok = false;
                        break;
                    }
                }
            }
            if ok {
                tier_vectors = Some(protos);
            }

            if !interests.is_empty() {
                let mut vs = Vec::with_capacity(interests.len());
                let mut ok = true;
                for phrase in &interests {
                    match embedder.embed(phrase).await {
                        Ok(v) => vs.push(v),
                        Err(e) => {
                            warn!(target: "scoring", error = %e, "interest embedding failed");
                            ok = false;
                            break;
                        }
                    }
                }
                if ok {
                    interest_vectors = Some(vs);
                }
            }
        }

        Self {
            caps,
            interests,
            tier_vectors,
            interest_vectors,
        }
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.caps
    }

    /// Exactly one tier, whatever path runs.
    pub async fn category(&self, record: &TrendRecord) -> Tier {
        let Some(embedder) = self.caps.embedder() else {
            return category::categorize_by_keywords(record);
        };
        let text = record.classification_text();

        let ai = match (self.caps.similarity(), self.tier_vectors.as_deref()) {
            (Some(sim), Some(protos)) => {
                match category::categorize_by_embedding(embedder, sim, &text, protos).await {
                    Ok(t) => t,
                    Err(e) => {
                        warn!(target: "scoring", error = %e, name = %record.name, "embedding categorization failed");
                        fallback_hit("category");
                        None
                    }
                }
            }
            (Some(_), None) => {
                // prototypes could not be embedded during prepare
                fallback_hit("category");
                None
            }
            (None, _) => category::categorize_by_overlap(&text),
        };

        ai.unwrap_or_else(|| category::categorize_by_keywords(record))
    }

    /// Polarity in [-1, 1].
    pub fn sentiment(&self, text: &str) -> f32 {
        if let Some(model) = self.caps.sentiment() {
            match model.polarity(text) {
                Ok(v) if v.is_finite() => return v.clamp(-1.0, 1.0),
                Ok(v) => {
                    warn!(target: "scoring", value = v, "sentiment model returned non-finite score");
                    fallback_hit("sentiment");
                }
                Err(e) => {
                    warn!(target: "scoring", error = %e, "sentiment model failed");
                    fallback_hit("sentiment");
                }
            }
        }
        clamp_or(sentiment::keyword_polarity(text), -1.0, 1.0, NEUTRAL_SENTIMENT)
    }

    /// Relevance in [0, 1]; 0.5 when there are no interests or no capabilities at all.
    pub async fn relevance(&self, record: &TrendRecord) -> f32 {
        if self.interests.is_empty() || self.caps.is_empty() {
            return NEUTRAL_RELEVANCE;
        }
        let text = record.summary_text();

        if let (Some(embedder), Some(sim), Some(vectors)) = (
            self.caps.embedder(),
            self.caps.similarity(),
            self.interest_vectors.as_deref(),
        ) {
            match relevance::embedding_relevance(embedder, sim, &text, vectors).await {
                Ok(v) => return clamp_or(v, 0.0, 1.0, NEUTRAL_RELEVANCE),
                Err(e) => {
                    warn!(target: "scoring", error = %e, name = %record.name, "embedding relevance failed");
                    fallback_hit("relevance");
                }
            }
        }

        clamp_or(
            relevance::lexical_relevance(&text, &self.interests),
            0.0,
            1.0,
            NEUTRAL_RELEVANCE,
        )
    }

    /// Fill category, sentiment and relevance on a fresh record.
    pub async fn enrich(&self, mut record: TrendRecord) -> TrendRecord {
        record.category = self.category(&record).await;
        record.sentiment_score = self.sentiment(&record.summary_text());
        record.relevance_score = self.relevance(&record).await;
        record.clamp_scores();
        debug!(
            target: "scoring",
            name = %record.name,
            category = record.category.as_str(),
            sentiment = record.sentiment_score,
            relevance = record.relevance_score,
            "enriched"
        );
        record
    }

    pub async fn enrich_all(&self, records: Vec<TrendRecord>) -> Vec<TrendRecord> {
        let mut out = Vec::with_capacity(records.len());
        for r in records {
            out.push(self.enrich(r).await);
        }
        out
    }

    /// Capability names that actually took part in scoring this run.
    ///
    /// Embedding and similarity only count once their prepared vectors exist;
    /// an embedder alone routes category through token overlap instead.
    pub fn capabilities_used(&self) -> Vec<Capability> {
        let mut used = Vec::new();
        if self.tier_vectors.is_some() || self.interest_vectors.is_some() {
            used.push(Capability::Embedding);
            used.push(Capability::Similarity);
        }
        if self.caps.sentiment().is_some() {
            used.push(Capability::SentimentLexicon);
        }
        used
    }
}

fn fallback_hit(field: &'static str) {
    counter!("scoring_fallbacks_total", "field" => field).increment(1);
}
