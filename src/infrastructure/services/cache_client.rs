//! Policy layer over the external vector store
//!
//! Applies the per-class distance threshold and the topic-first / global-
//! fallback search order. Every store call goes through the `store` circuit
//! breaker; breaker rejections and store failures degrade to a miss so the
//! system falls back to always-generate instead of failing the request.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::domain::{CacheEntry, CachePolicy, DomainError, VectorStore, GENERAL_TOPIC};
use crate::infrastructure::resilience::CircuitBreaker;

/// A cache lookup that satisfied the policy threshold.
#[derive(Debug, Clone)]
pub struct CacheHit {
    pub entry: CacheEntry,
    pub distance: f32,
}

/// Typed client for the vector store, guarded by the `store` breaker.
#[derive(Debug, Clone)]
pub struct VectorCacheClient {
    store: Arc<dyn VectorStore>,
    breaker: Arc<CircuitBreaker>,
}

impl VectorCacheClient {
    pub fn new(store: Arc<dyn VectorStore>, breaker: Arc<CircuitBreaker>) -> Self {
        Self { store, breaker }
    }

    /// Find a reusable answer for `embedding` under `policy`.
    ///
    /// Searches the topic partition first (skipped for the general topic); a
    /// within-threshold neighbor there wins. Otherwise one unrestricted
    /// search runs as a global fallback. A neighbor beyond the threshold is
    /// reported as absent.
    pub async fn lookup(
        &self,
        embedding: &[f32],
        policy: &CachePolicy,
        topic: &str,
    ) -> Option<CacheHit> {
        if topic != GENERAL_TOPIC {
            match self.guarded_find(embedding, Some(topic)).await {
                Ok(Some(neighbor)) if neighbor.distance <= policy.distance_threshold => {
                    debug!(topic, distance = neighbor.distance, "cache hit in topic partition");
                    return Some(CacheHit {
                        distance: neighbor.distance,
                        entry: neighbor.entry,
                    });
                }
                Ok(_) => {
                    debug!(topic, "no match in topic partition, falling back to global search");
                }
                Err(error) => {
                    self.log_degraded(&error);
                    return None;
                }
            }
        }

        match self.guarded_find(embedding, None).await {
            Ok(Some(neighbor)) if neighbor.distance <= policy.distance_threshold => {
                debug!(distance = neighbor.distance, "cache hit in global search");
                Some(CacheHit {
                    distance: neighbor.distance,
                    entry: neighbor.entry,
                })
            }
            Ok(Some(neighbor)) => {
                debug!(
                    distance = neighbor.distance,
                    threshold = policy.distance_threshold,
                    "nearest neighbor beyond threshold, treating as miss"
                );
                None
            }
            Ok(None) => None,
            Err(error) => {
                self.log_degraded(&error);
                None
            }
        }
    }

    /// Write an entry with store-side expiry. The caller decides whether a
    /// failure matters; for the request path it never does.
    pub async fn store(&self, entry: CacheEntry, ttl: Duration) -> Result<(), DomainError> {
        self.breaker
            .execute(|| self.store.upsert(entry, ttl))
            .await
    }

    async fn guarded_find(
        &self,
        embedding: &[f32],
        partition: Option<&str>,
    ) -> Result<Option<crate::domain::Neighbor>, DomainError> {
        self.breaker
            .execute(|| self.store.find_nearest(embedding, partition))
            .await
    }

    fn log_degraded(&self, error: &DomainError) {
        if error.is_circuit_open() {
            warn!("store circuit open, skipping cache lookup");
        } else {
            warn!(error = %error, "store lookup failed, treating as cache miss");
        }
    }
}
