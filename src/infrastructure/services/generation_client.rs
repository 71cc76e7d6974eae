//! Typed client for the generation service, guarded by its circuit breaker

use std::sync::Arc;

use crate::domain::{DomainError, GenerationProvider};
use crate::infrastructure::resilience::CircuitBreaker;

/// Wraps the generation provider so every call passes through the
/// `generation` breaker. Failure kinds pass through unchanged; the breaker
/// only gates and records.
#[derive(Debug, Clone)]
pub struct GenerationClient {
    provider: Arc<dyn GenerationProvider>,
    breaker: Arc<CircuitBreaker>,
}

impl GenerationClient {
    pub fn new(provider: Arc<dyn GenerationProvider>, breaker: Arc<CircuitBreaker>) -> Self {
        Self { provider, breaker }
    }

    pub async fn generate(&self, query: &str) -> Result<String, DomainError> {
        self.breaker
            .execute(|| self.provider.complete(query))
            .await
    }
}
