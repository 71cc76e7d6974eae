//! In-memory vector store using linear search
//!
//! Suitable for development and tests. Expiry is evaluated lazily at read
//! time, mirroring how the external store owns TTL semantics.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::domain::{cosine_distance, CacheEntry, DomainError, Neighbor, VectorStore};

#[derive(Debug)]
struct StoredEntry {
    entry: CacheEntry,
    expires_at: Instant,
}

/// Linear-scan vector store keyed by content address.
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    entries: RwLock<HashMap<String, StoredEntry>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().expect("store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn find_nearest(
        &self,
        embedding: &[f32],
        partition: Option<&str>,
    ) -> Result<Option<Neighbor>, DomainError> {
        let entries = self
            .entries
            .read()
            .map_err(|e| DomainError::store(format!("failed to acquire read lock: {}", e)))?;

        let now = Instant::now();
        let nearest = entries
            .values()
            .filter(|stored| stored.expires_at > now)
            .filter(|stored| partition.is_none_or(|topic| stored.entry.topic == topic))
            .map(|stored| Neighbor {
                entry: stored.entry.clone(),
                distance: cosine_distance(embedding, &stored.entry.embedding),
            })
            .min_by(|a, b| {
                a.distance
                    .partial_cmp(&b.distance)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

        Ok(nearest)
    }

    async fn upsert(&self, entry: CacheEntry, ttl: Duration) -> Result<(), DomainError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| DomainError::store(format!("failed to acquire write lock: {}", e)))?;

        entries.insert(
            entry.key.clone(),
            StoredEntry {
                entry,
                expires_at: Instant::now() + ttl,
            },
        );

        Ok(())
    }
}
