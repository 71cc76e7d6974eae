//! Domain layer: pure types and the trait seams to external collaborators

pub mod cache;
pub mod classifier;
pub mod embedding;
mod error;
pub mod generation;

pub use cache::{cache_key, CacheEntry, CachePolicy, Neighbor, VectorStore};
pub use classifier::{classify, Classification, TemporalClass, GENERAL_TOPIC};
pub use embedding::{cosine_distance, cosine_similarity, EmbeddingProvider};
pub use error::DomainError;
pub use generation::GenerationProvider;
