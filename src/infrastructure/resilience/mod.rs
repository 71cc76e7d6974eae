//! Resilience layer: circuit breakers for external dependencies

mod circuit_breaker;

use std::sync::Arc;

pub use circuit_breaker::{
    CircuitBreaker, CircuitBreakerConfig, CircuitBreakerStatus, CircuitState,
};

/// Dependency name for the vector store breaker.
pub const STORE_CIRCUIT: &str = "store";
/// Dependency name for the generation service breaker.
pub const GENERATION_CIRCUIT: &str = "generation";

/// Explicit registry of breakers, one per guarded dependency name.
///
/// Constructed once at startup and passed by reference; never recreated per
/// request.
#[derive(Debug, Clone)]
pub struct CircuitBreakerRegistry {
    breakers: Vec<Arc<CircuitBreaker>>,
}

impl CircuitBreakerRegistry {
    pub fn new() -> Self {
        Self {
            breakers: Vec::new(),
        }
    }

    pub fn register(&mut self, name: &str, config: CircuitBreakerConfig) -> Arc<CircuitBreaker> {
        let breaker = Arc::new(CircuitBreaker::new(name, config));
        self.breakers.push(breaker.clone());
        breaker
    }

    pub fn get(&self, name: &str) -> Option<Arc<CircuitBreaker>> {
        self.breakers.iter().find(|b| b.name() == name).cloned()
    }

    pub fn statuses(&self) -> Vec<CircuitBreakerStatus> {
        self.breakers.iter().map(|b| b.status()).collect()
    }
}

impl Default for CircuitBreakerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_registry_lookup_and_statuses() {
        let mut registry = CircuitBreakerRegistry::new();
        registry.register(
            STORE_CIRCUIT,
            CircuitBreakerConfig {
                failure_threshold: 3,
                recovery_timeout: Duration::from_secs(10),
            },
        );
        registry.register(
            GENERATION_CIRCUIT,
            CircuitBreakerConfig {
                failure_threshold: 3,
                recovery_timeout: Duration::from_secs(30),
            },
        );

        assert!(registry.get(STORE_CIRCUIT).is_some());
        assert!(registry.get("unknown").is_none());

        let statuses = registry.statuses();
        assert_eq!(statuses.len(), 2);
        assert_eq!(statuses[0].name, STORE_CIRCUIT);
        assert_eq!(statuses[1].recovery_timeout_seconds, 30);
    }
}
