//! Cached query/answer records

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::classifier::{Classification, TemporalClass};

/// A persisted cache record. Owned by the vector store; the core only
/// constructs and interprets it. Expiry is the store's responsibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Content address of the normalized query text. Identical resubmissions
    /// overwrite instead of duplicating.
    pub key: String,
    pub query: String,
    pub response: String,
    pub temporal_class: TemporalClass,
    pub topic: String,
    pub embedding: Vec<f32>,
    /// Unix seconds.
    pub created_at: i64,
}

impl CacheEntry {
    pub fn new(
        query: impl Into<String>,
        response: impl Into<String>,
        classification: &Classification,
        embedding: Vec<f32>,
    ) -> Self {
        let query = query.into();

        Self {
            key: cache_key(&query),
            query,
            response: response.into(),
            temporal_class: classification.temporal_class,
            topic: classification.topic.clone(),
            embedding,
            created_at: Utc::now().timestamp(),
        }
    }
}

/// Deterministic content address for a query: hex SHA-256 of the trimmed,
/// lowercased text.
pub fn cache_key(query: &str) -> String {
    let normalized = query.trim().to_lowercase();
    let digest = Sha256::digest(normalized.as_bytes());
    hex::encode(digest)
}
