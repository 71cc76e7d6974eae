//! Application services composing domain logic with infrastructure

pub mod cache_client;
pub mod generation_client;
pub mod query_service;

pub use cache_client::{CacheHit, VectorCacheClient};
pub use generation_client::GenerationClient;
pub use query_service::{QueryOutcome, QueryService, ResponseSource};
