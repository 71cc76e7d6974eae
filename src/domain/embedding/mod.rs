//! Embedding provider contract and vector math

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::DomainError;

/// Trait for embedding providers.
///
/// Implementations must return a fixed-length normalized vector and be
/// deterministic for identical input. The dimension is configuration, not a
/// property of the core's logic.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + Debug {
    /// Generate a normalized embedding for the given text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError>;

    /// Embedding dimension this provider produces.
    fn dimensions(&self) -> usize;
}

/// Cosine similarity between two vectors. Returns 0.0 for mismatched or
/// zero-magnitude inputs.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }

    dot / (mag_a * mag_b)
}

/// Cosine distance in [0, 2]; 0 means identical direction.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    1.0 - cosine_similarity(a, b)
}
