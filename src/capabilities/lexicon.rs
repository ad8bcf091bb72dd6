// src/capabilities/lexicon.rs
//! Lexicon-based sentiment model (word -> valence in [-4, 4]).
//!
//! Compound polarity: the summed valence normalized with `x / sqrt(x^2 + 15)`,
//! so the result always lands in (-1, 1). A negator in the previous 1..=3
//! tokens flips the sign of a word's valence.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{RadarError, Result};
use crate::scoring::text::tokenize;

const NORMALIZATION_ALPHA: f64 = 15.0;

/// A sentiment model returning a compound polarity in [-1, 1].
pub trait SentimentModel: Send + Sync {
    fn polarity(&self, text: &str) -> Result<f32>;
    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone)]
pub struct LexiconSentiment {
    lexicon: HashMap<String, f32>,
}

impl LexiconSentiment {
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| {
            RadarError::enrichment("sentiment_lexicon", format!("{}: {e}", path.display()))
        })?;
        let map: HashMap<String, f32> = serde_json::from_str(&raw).map_err(|e| {
            RadarError::enrichment("sentiment_lexicon", format!("{}: {e}", path.display()))
        })?;
        Self::from_map(map)
    }

    pub fn from_map(map: HashMap<String, f32>) -> Result<Self> {
        let lexicon: HashMap<String, f32> = map
            .into_iter()
            .filter(|(_, v)| v.is_finite())
            .map(|(k, v)| (k.trim().to_lowercase(), v.clamp(-4.0, 4.0)))
            .filter(|(k, _)| !k.is_empty())
            .collect();
        if lexicon.is_empty() {
            return Err(RadarError::enrichment("sentiment_lexicon", "empty lexicon"));
        }
        Ok(Self { lexicon })
    }

    pub fn len(&self) -> usize {
        self.lexicon.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lexicon.is_empty()
    }

    fn raw_score(&self, text: &str) -> f64 {
        let tokens: Vec<String> = tokenize(text).collect();
        let mut score = 0.0f64;
        for (i, tok) in tokens.iter().enumerate() {
            let Some(&base) = self.lexicon.get(tok.as_str()) else {
                continue;
            };
            let negated = (1..=3).any(|k| i >= k && is_negator(tokens[i - k].as_str()));
            score += if negated { -base as f64 } else { base as f64 };
        }
        score
    }
}

impl SentimentModel for LexiconSentiment {
    fn polarity(&self, text: &str) -> Result<f32> {
        let s = self.raw_score(text);
        if s == 0.0 {
            return Ok(0.0);
        }
        let compound = s / (s * s + NORMALIZATION_ALPHA).sqrt();
        Ok(compound.clamp(-1.0, 1.0) as f32)
    }

    fn name(&self) -> &'static str {
        "lexicon"
    }
}

fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not"
            | "no"
            | "never"
            | "isn't"
            | "wasn't"
            | "aren't"
            | "won't"
            | "can't"
            | "cannot"
            | "without"
            | "nor"
    )
}
