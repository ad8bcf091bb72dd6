// src/capabilities/embedding.rs
//! Text embedders: a local feature-hashing model and a remote embeddings endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Mutex;
use std::time::Duration;

use crate::error::{RadarError, Result};
use crate::scoring::text::tokenize;

#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
    fn name(&self) -> &'static str;
}

// ------------------------------------------------------------
// Local hashing embedder
// ------------------------------------------------------------

/// Signed feature hashing over tokens and character trigrams, L2-normalized.
/// Deterministic within a build; no model files needed.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dims: usize,
}

impl HashingEmbedder {
    pub fn new(dims: usize) -> Self {
        Self { dims: dims.max(8) }
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    fn add_feature(&self, v: &mut [f32], feature: &str, weight: f32) {
        let mut h = DefaultHasher::new();
        feature.hash(&mut h);
        let bits = h.finish();
        let idx = (bits % self.dims as u64) as usize;
        let sign = if bits >> 63 == 0 { 1.0 } else { -1.0 };
        v[idx] += sign * weight;
    }

    fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dims];
        for tok in tokenize(text) {
            self.add_feature(&mut v, &tok, 1.0);
            let padded: Vec<char> = format!("^{tok}$").chars().collect();
            for w in padded.windows(3) {
                let tri: String = w.iter().collect();
                self.add_feature(&mut v, &tri, 0.5);
            }
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            v.iter_mut().for_each(|x| *x /= norm);
        }
        v
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_sync(text))
    }

    fn name(&self) -> &'static str {
        "hashing"
    }
}

// ------------------------------------------------------------
// Remote embeddings endpoint (OpenAI-compatible)
// ------------------------------------------------------------

/// Calls an OpenAI-compatible `/v1/embeddings` endpoint. Results are memoized
/// in-process since tier prototypes and interests are embedded repeatedly.
pub struct OpenAiEmbedder {
    http: reqwest::Client,
    api_key: String,
    model: String,
    url: String,
    memo: Mutex<HashMap<String, Vec<f32>>>,
}

impl OpenAiEmbedder {
    pub fn new(api_key: String, model: &str, url: &str) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(RadarError::enrichment("embedding", "missing OPENAI_API_KEY"));
        }
        let http = reqwest::Client::builder()
            .user_agent("tech-radar-updater/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| RadarError::enrichment("embedding", e))?;
        Ok(Self {
            http,
            api_key,
            model: model.to_string(),
            url: url.to_string(),
            memo: Mutex::new(HashMap::new()),
        })
    }

    fn memo_get(&self, text: &str) -> Option<Vec<f32>> {
        self.memo.lock().ok()?.get(text).cloned()
    }

    fn memo_put(&self, text: &str, v: &[f32]) {
        if let Ok(mut g) = self.memo.lock() {
            g.insert(text.to_string(), v.to_vec());
        }
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if let Some(hit) = self.memo_get(text) {
            return Ok(hit);
        }

        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            input: &'a str,
        }
        #[derive(Deserialize)]
        struct Resp {
            data: Vec<Item>,
        }
        #[derive(Deserialize)]
        struct Item {
            embedding: Vec<f32>,
        }

        let resp = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&Req {
                model: &self.model,
                input: text,
            })
            .send()
            .await
            .map_err(|e| RadarError::enrichment("embedding", e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RadarError::enrichment(
                "embedding",
                format!("embeddings endpoint returned {status}"),
            ));
        }
        let body: Resp = resp
            .json()
            .await
            .map_err(|e| RadarError::enrichment("embedding", e))?;
        let v = body
            .data
            .into_iter()
            .next()
            .map(|i| i.embedding)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| RadarError::enrichment("embedding", "empty embedding"))?;

        self.memo_put(text, &v);
        Ok(v)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}
