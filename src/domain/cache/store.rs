//! Vector store contract
//!
//! The core only specifies the query and result semantics it needs from the
//! external store; indexing internals are out of scope.

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;

use super::CacheEntry;
use crate::domain::DomainError;

/// The nearest stored entry to a query vector, with its cosine distance
/// (0 = identical direction, range [0, 2]).
#[derive(Debug, Clone)]
pub struct Neighbor {
    pub entry: CacheEntry,
    pub distance: f32,
}

/// Contract a vector store must satisfy.
#[async_trait]
pub trait VectorStore: Send + Sync + Debug {
    /// Find the single nearest entry to `embedding`, optionally restricted to
    /// a topic partition. `None` when the store holds no candidate.
    async fn find_nearest(
        &self,
        embedding: &[f32],
        partition: Option<&str>,
    ) -> Result<Option<Neighbor>, DomainError>;

    /// Write an entry keyed by its content address, expiring after `ttl`.
    /// Re-storing an identical query overwrites.
    async fn upsert(&self, entry: CacheEntry, ttl: Duration) -> Result<(), DomainError>;
}
