//! Relevance to the configured interests: best match over a linear scan of
//! interest phrases.

use crate::capabilities::{Embedder, VectorSimilarity};
use crate::error::Result;
use crate::scoring::text::jaccard;

/// Max Jaccard overlap between `text` and any interest phrase.
pub fn lexical_relevance(text: &str, interests: &[String]) -> f32 {
    interests
        .iter()
        .map(|i| jaccard(text, i))
        .fold(0.0f32, f32::max)
}

/// Max cosine between the text embedding and the prepared interest embeddings,
/// clamped into [0, 1].
pub async fn embedding_relevance(
    embedder: &dyn Embedder,
    similarity: &dyn VectorSimilarity,
    text: &str,
    interest_vectors: &[Vec<f32>],
) -> Result<f32> {
    let v = embedder.embed(text).await?;
    let mut best = 0.0f32;
    for iv in interest_vectors {
        let s = similarity.similarity(&v, iv)?;
        if s.is_finite() {
            best = best.max(s);
        }
    }
    Ok(best.clamp(0.0, 1.0))
}
