// src/capabilities/similarity.rs
use crate::error::{RadarError, Result};

/// Vector similarity routine used alongside an embedder.
pub trait VectorSimilarity: Send + Sync {
    fn similarity(&self, a: &[f32], b: &[f32]) -> Result<f32>;
    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CosineSimilarity;

impl VectorSimilarity for CosineSimilarity {
    fn similarity(&self, a: &[f32], b: &[f32]) -> Result<f32> {
        if a.len() != b.len() {
            return Err(RadarError::enrichment(
                "similarity",
                format!("dimension mismatch: {} vs {}", a.len(), b.len()),
            ));
        }
        let mut dot = 0.0f64;
        let mut na = 0.0f64;
        let mut nb = 0.0f64;
        for (x, y) in a.iter().zip(b) {
            let (x, y) = (*x as f64, *y as f64);
            dot += x * y;
            na += x * x;
            nb += y * y;
        }
        if na == 0.0 || nb == 0.0 {
            return Ok(0.0);
        }
        let sim = dot / (na.sqrt() * nb.sqrt());
        if !sim.is_finite() {
            return Err(RadarError::enrichment("similarity", "non-finite cosine"));
        }
        Ok(sim.clamp(-1.0, 1.0) as f32)
    }

    fn name(&self) -> &'static str {
        "cosine"
    }
}

/// Sanity check run once at acquisition time.
pub(crate) fn self_check(sim: &dyn VectorSimilarity) -> Result<()> {
    let same = sim.similarity(&[1.0, 0.0, 0.0], &[2.0, 0.0, 0.0])?;
    let ortho = sim.similarity(&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0])?;
    if (same - 1.0).abs() > 1e-4 || ortho.abs() > 1e-4 {
        return Err(RadarError::enrichment(
            "similarity",
            format!("self-check failed (same={same}, orthogonal={ortho})"),
        ));
    }
    Ok(())
}
