//! Query orchestrator
//!
//! Sequences classification, embedding, cache lookup, generation and cache
//! write for one request, and records exactly one stats sample per request.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::{
    classify, CacheEntry, CachePolicy, Classification, DomainError, EmbeddingProvider,
};
use crate::infrastructure::services::{CacheHit, GenerationClient, VectorCacheClient};
use crate::infrastructure::stats::{ErrorKind, RequestSample, SampleOutcome, StatsAggregator};

/// Where the answer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseSource {
    Cache,
    Generation,
}

/// Result of handling one query.
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    pub answer: String,
    pub source: ResponseSource,
    pub classification: Classification,
    /// Similarity of the matched entry (1 - distance), cache hits only.
    pub similarity: Option<f32>,
}

/// Orchestrates the cache decision for each request. Collaborators are
/// constructed once at startup and injected; the service itself is stateless
/// apart from the shared stats aggregator.
#[derive(Debug, Clone)]
pub struct QueryService {
    embedding: Arc<dyn EmbeddingProvider>,
    cache: VectorCacheClient,
    generation: GenerationClient,
    stats: Arc<StatsAggregator>,
}

impl QueryService {
    pub fn new(
        embedding: Arc<dyn EmbeddingProvider>,
        cache: VectorCacheClient,
        generation: GenerationClient,
        stats: Arc<StatsAggregator>,
    ) -> Self {
        Self {
            embedding,
            cache,
            generation,
            stats,
        }
    }

    /// Answer a query, reusing a cached answer when one is close enough.
    ///
    /// `force_refresh` skips the lookup but still stores the fresh answer.
    /// Generation failures propagate unchanged and are never cached.
    pub async fn handle(
        &self,
        query: &str,
        force_refresh: bool,
    ) -> Result<QueryOutcome, DomainError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(DomainError::validation("query must not be empty"));
        }

        let started = Instant::now();
        let classification = classify(query);
        let policy = CachePolicy::for_class(classification.temporal_class);

        debug!(
            temporal_class = classification.temporal_class.as_str(),
            topic = %classification.topic,
            confidence = classification.confidence,
            threshold = policy.distance_threshold,
            ttl_secs = policy.ttl.as_secs(),
            "query classified"
        );

        // Without an embedding there is nothing to look up or store; degrade
        // to plain generation for this request.
        let embedding = match self.embedding.embed(query).await {
            Ok(vector) => Some(vector),
            Err(error) => {
                warn!(error = %error, "embedding failed, skipping cache for this request");
                None
            }
        };

        let mut cache_ms = None;
        if !force_refresh {
            if let Some(ref embedding) = embedding {
                let lookup_started = Instant::now();
                let hit = self
                    .cache
                    .lookup(embedding, &policy, &classification.topic)
                    .await;
                cache_ms = Some(elapsed_ms(lookup_started));

                if let Some(hit) = hit {
                    return Ok(self.finish_hit(hit, classification, cache_ms, started));
                }
            }
        }

        info!(query = %truncate(query, 50), "cache miss, generating answer");

        let generation_started = Instant::now();
        let answer = match self.generation.generate(query).await {
            Ok(answer) => answer,
            Err(error) => {
                self.stats.record(RequestSample {
                    outcome: SampleOutcome::Error(ErrorKind::of(&error)),
                    temporal_class: classification.temporal_class,
                    topic: classification.topic.clone(),
                    cache_ms,
                    generation_ms: Some(elapsed_ms(generation_started)),
                    total_ms: elapsed_ms(started),
                });
                return Err(error);
            }
        };
        let generation_ms = elapsed_ms(generation_started);

        if let Some(embedding) = embedding {
            let entry = CacheEntry::new(query, &answer, &classification, embedding);
            if let Err(error) = self.cache.store(entry, policy.ttl).await {
                // The answer exists; a failed cache write must not fail the
                // request.
                warn!(error = %error, "cache store failed, returning generated answer");
            }
        }

        self.stats.record(RequestSample {
            outcome: SampleOutcome::Miss,
            temporal_class: classification.temporal_class,
            topic: classification.topic.clone(),
            cache_ms,
            generation_ms: Some(generation_ms),
            total_ms: elapsed_ms(started),
        });

        Ok(QueryOutcome {
            answer,
            source: ResponseSource::Generation,
            classification,
            similarity: None,
        })
    }

    fn finish_hit(
        &self,
        hit: CacheHit,
        classification: Classification,
        cache_ms: Option<f64>,
        started: Instant,
    ) -> QueryOutcome {
        let similarity = round4(1.0 - hit.distance);

        info!(
            distance = hit.distance,
            similarity,
            query = %truncate(&hit.entry.query, 50),
            "cache hit"
        );

        self.stats.record(RequestSample {
            outcome: SampleOutcome::Hit,
            temporal_class: classification.temporal_class,
            topic: classification.topic.clone(),
            cache_ms,
            generation_ms: None,
            total_ms: elapsed_ms(started),
        });

        QueryOutcome {
            answer: hit.entry.response,
            source: ResponseSource::Cache,
            classification,
            similarity: Some(similarity),
        }
    }
}

fn elapsed_ms(since: Instant) -> f64 {
    since.elapsed().as_secs_f64() * 1000.0
}

fn round4(value: f32) -> f32 {
    (value * 10_000.0).round() / 10_000.0
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::embedding::mock::MockEmbeddingProvider;
    use crate::domain::generation::mock::{MockFailure, MockGenerationProvider};
    use crate::domain::{TemporalClass, VectorStore};
    use crate::infrastructure::resilience::{CircuitBreaker, CircuitBreakerConfig};
    use crate::infrastructure::vector_store::InMemoryVectorStore;

    fn breaker(name: &str) -> Arc<CircuitBreaker> {
        Arc::new(CircuitBreaker::new(
            name,
            CircuitBreakerConfig {
                failure_threshold: 3,
                recovery_timeout: Duration::from_secs(10),
            },
        ))
    }

    struct Harness {
        service: QueryService,
        stats: Arc<StatsAggregator>,
        generation: Arc<MockGenerationProvider>,
        store_breaker: Arc<CircuitBreaker>,
    }

    fn harness(
        embedding: MockEmbeddingProvider,
        generation: MockGenerationProvider,
        store: Arc<dyn VectorStore>,
    ) -> Harness {
        let stats = Arc::new(StatsAggregator::new());
        let generation = Arc::new(generation);
        let store_breaker = breaker("store");

        let service = QueryService::new(
            Arc::new(embedding),
            VectorCacheClient::new(store, store_breaker.clone()),
            GenerationClient::new(generation.clone(), breaker("generation")),
            stats.clone(),
        );

        Harness {
            service,
            stats,
            generation,
            store_breaker,
        }
    }

    /// Unit vector at cosine distance `d` from [1, 0].
    fn vector_at_distance(d: f32) -> Vec<f32> {
        let cos = 1.0 - d;
        vec![cos, (1.0 - cos * cos).sqrt()]
    }

    #[tokio::test]
    async fn test_empty_query_is_rejected_before_classification() {
        let h = harness(
            MockEmbeddingProvider::new(2),
            MockGenerationProvider::answering("unused"),
            Arc::new(InMemoryVectorStore::new()),
        );

        let result = h.service.handle("   \t  ", false).await;

        assert!(matches!(result, Err(DomainError::Validation { .. })));
        assert_eq!(h.stats.snapshot().total_queries, 0);
        assert_eq!(h.generation.calls(), 0);
    }

    #[tokio::test]
    async fn test_miss_generates_stores_then_paraphrase_hits() {
        let embedding = MockEmbeddingProvider::new(2)
            .with_vector("What is the capital of France?", vec![1.0, 0.0])
            .with_vector("What's France's capital?", vector_at_distance(0.18));
        let h = harness(
            embedding,
            MockGenerationProvider::answering("Paris"),
            Arc::new(InMemoryVectorStore::new()),
        );

        let first = h
            .service
            .handle("What is the capital of France?", false)
            .await
            .unwrap();
        assert_eq!(first.source, ResponseSource::Generation);
        assert_eq!(first.answer, "Paris");
        assert_eq!(
            first.classification.temporal_class,
            TemporalClass::Evergreen
        );

        // 0.18 is inside the evergreen threshold of 0.30.
        let second = h
            .service
            .handle("What's France's capital?", false)
            .await
            .unwrap();
        assert_eq!(second.source, ResponseSource::Cache);
        assert_eq!(second.answer, "Paris");
        assert!((second.similarity.unwrap() - 0.82).abs() < 1e-3);
        assert_eq!(h.generation.calls(), 1);

        let snapshot = h.stats.snapshot();
        assert_eq!(snapshot.total_queries, 2);
        assert_eq!(snapshot.cache_hits, 1);
        assert_eq!(snapshot.cache_misses, 1);
    }

    #[tokio::test]
    async fn test_time_sensitive_paraphrase_beyond_threshold_misses() {
        let embedding = MockEmbeddingProvider::new(2)
            .with_vector("What's the weather in NYC today?", vec![1.0, 0.0])
            .with_vector("What's the weather in LA today?", vector_at_distance(0.22));
        let h = harness(
            embedding,
            MockGenerationProvider::answering("sunny"),
            Arc::new(InMemoryVectorStore::new()),
        );

        h.service
            .handle("What's the weather in NYC today?", false)
            .await
            .unwrap();

        // 0.22 > 0.15: both queries must generate.
        let second = h
            .service
            .handle("What's the weather in LA today?", false)
            .await
            .unwrap();
        assert_eq!(second.source, ResponseSource::Generation);
        assert_eq!(h.generation.calls(), 2);
    }

    #[tokio::test]
    async fn test_force_refresh_bypasses_lookup_but_still_stores() {
        let embedding =
            MockEmbeddingProvider::new(2).with_vector("what is a monad", vec![1.0, 0.0]);
        let store = Arc::new(InMemoryVectorStore::new());
        let h = harness(
            embedding,
            MockGenerationProvider::answering("a monoid in disguise"),
            store.clone(),
        );

        h.service.handle("what is a monad", false).await.unwrap();
        assert_eq!(store.len(), 1);

        let refreshed = h.service.handle("what is a monad", true).await.unwrap();
        assert_eq!(refreshed.source, ResponseSource::Generation);
        assert_eq!(h.generation.calls(), 2);
        // Identical query overwrites its own entry.
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_generation_failure_propagates_and_is_not_cached() {
        let store = Arc::new(InMemoryVectorStore::new());
        let h = harness(
            MockEmbeddingProvider::new(2),
            MockGenerationProvider::failing(MockFailure::Throttled),
            store.clone(),
        );

        let result = h.service.handle("what is a quark", false).await;

        assert!(matches!(result, Err(DomainError::Throttled { .. })));
        assert!(store.is_empty());

        let snapshot = h.stats.snapshot();
        assert_eq!(snapshot.total_queries, 1);
        assert_eq!(snapshot.error_total(), 1);
    }

    #[derive(Debug)]
    struct FailingStore;

    #[async_trait::async_trait]
    impl VectorStore for FailingStore {
        async fn find_nearest(
            &self,
            _embedding: &[f32],
            _partition: Option<&str>,
        ) -> Result<Option<crate::domain::Neighbor>, DomainError> {
            Err(DomainError::store("connection refused"))
        }

        async fn upsert(&self, _entry: CacheEntry, _ttl: Duration) -> Result<(), DomainError> {
            Err(DomainError::store("connection refused"))
        }
    }

    #[tokio::test]
    async fn test_store_failure_still_returns_generated_answer() {
        let h = harness(
            MockEmbeddingProvider::new(2),
            MockGenerationProvider::answering("42"),
            Arc::new(FailingStore),
        );

        let outcome = h.service.handle("meaning of life", false).await.unwrap();

        assert_eq!(outcome.answer, "42");
        assert_eq!(outcome.source, ResponseSource::Generation);

        // Recorded as a miss, not an error.
        let snapshot = h.stats.snapshot();
        assert_eq!(snapshot.cache_misses, 1);
        assert_eq!(snapshot.error_total(), 0);
    }

    #[tokio::test]
    async fn test_open_store_circuit_degrades_to_generation() {
        let h = harness(
            MockEmbeddingProvider::new(2),
            MockGenerationProvider::answering("degraded answer"),
            Arc::new(FailingStore),
        );

        // Each request fails lookup + store; two requests trip the breaker.
        for _ in 0..2 {
            h.service.handle("some question", false).await.unwrap();
        }
        assert_eq!(
            h.store_breaker.state(),
            crate::infrastructure::resilience::CircuitState::Open
        );

        let outcome = h.service.handle("some question", false).await.unwrap();
        assert_eq!(outcome.source, ResponseSource::Generation);
        assert_eq!(outcome.answer, "degraded answer");

        let snapshot = h.stats.snapshot();
        assert_eq!(snapshot.total_queries, 3);
        assert_eq!(snapshot.cache_misses, 3);
        assert_eq!(snapshot.error_total(), 0);
    }

    #[tokio::test]
    async fn test_embedding_failure_degrades_to_plain_generation() {
        let store = Arc::new(InMemoryVectorStore::new());
        let h = harness(
            MockEmbeddingProvider::new(2).with_error("model not loaded"),
            MockGenerationProvider::answering("still answered"),
            store.clone(),
        );

        let outcome = h.service.handle("any question", false).await.unwrap();

        assert_eq!(outcome.answer, "still answered");
        assert_eq!(outcome.source, ResponseSource::Generation);
        // Nothing stored without an embedding.
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_one_stats_record_per_request() {
        let h = harness(
            MockEmbeddingProvider::new(2),
            MockGenerationProvider::answering("a"),
            Arc::new(InMemoryVectorStore::new()),
        );

        h.service.handle("first", false).await.unwrap();
        h.service.handle("second", false).await.unwrap();

        let snapshot = h.stats.snapshot();
        assert_eq!(snapshot.total_queries, 2);
        assert_eq!(snapshot.cache_hits + snapshot.cache_misses, 2);
    }
}
