//! Semantic cache service
//!
//! Answers LLM queries through a similarity cache: queries are classified by
//! temporal sensitivity and topic, embedded, and matched against previously
//! generated answers. Close enough matches are served from the cache; misses
//! are generated and stored under a class-dependent TTL. Circuit breakers
//! guard the vector store and the generation service so either can fail
//! without taking the API down.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use api::AppState;
use config::{AppConfig, BreakerConfig, CacheBackend};
use domain::{EmbeddingProvider, GenerationProvider, VectorStore};
use infrastructure::embedding::HttpEmbeddingProvider;
use infrastructure::generation::OpenAiGenerationProvider;
use infrastructure::resilience::{
    CircuitBreakerConfig, CircuitBreakerRegistry, GENERATION_CIRCUIT, STORE_CIRCUIT,
};
use infrastructure::services::{GenerationClient, QueryService, VectorCacheClient};
use infrastructure::stats::StatsAggregator;
use infrastructure::vector_store::{InMemoryVectorStore, RedisVectorStore};

/// Wire up providers, breakers and services from configuration.
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let embedding: Arc<dyn EmbeddingProvider> = Arc::new(HttpEmbeddingProvider::new(
        &config.embedding.base_url,
        &config.embedding.api_key,
        &config.embedding.model,
        config.embedding.dimensions,
    ));

    let generation: Arc<dyn GenerationProvider> = Arc::new(OpenAiGenerationProvider::new(
        &config.generation.base_url,
        &config.generation.api_key,
        &config.generation.model,
    ));

    let store: Arc<dyn VectorStore> = match config.cache.backend {
        CacheBackend::Memory => {
            info!("using in-memory vector store");
            Arc::new(InMemoryVectorStore::new())
        }
        CacheBackend::Redis => {
            info!(url = %config.cache.redis_url, "connecting to redis vector store");
            Arc::new(
                RedisVectorStore::connect(
                    &config.cache.redis_url,
                    &config.cache.index,
                    &config.cache.key_prefix,
                    config.embedding.dimensions,
                )
                .await?,
            )
        }
    };

    let mut registry = CircuitBreakerRegistry::new();
    let store_breaker = registry.register(STORE_CIRCUIT, breaker_config(&config.breakers.store));
    let generation_breaker = registry.register(
        GENERATION_CIRCUIT,
        breaker_config(&config.breakers.generation),
    );

    let stats = Arc::new(StatsAggregator::new());
    let query_service = QueryService::new(
        embedding,
        VectorCacheClient::new(store, store_breaker),
        GenerationClient::new(generation, generation_breaker),
        stats.clone(),
    );

    Ok(AppState::new(
        Arc::new(query_service),
        stats,
        Arc::new(registry),
    ))
}

fn breaker_config(config: &BreakerConfig) -> CircuitBreakerConfig {
    CircuitBreakerConfig {
        failure_threshold: config.failure_threshold,
        recovery_timeout: Duration::from_secs(config.recovery_timeout_seconds),
    }
}
