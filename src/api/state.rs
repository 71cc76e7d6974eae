//! Application state for shared services

use std::sync::Arc;

use crate::infrastructure::resilience::CircuitBreakerRegistry;
use crate::infrastructure::services::QueryService;
use crate::infrastructure::stats::StatsAggregator;

/// Shared handles cloned into every request handler.
#[derive(Clone)]
pub struct AppState {
    pub query_service: Arc<QueryService>,
    pub stats: Arc<StatsAggregator>,
    pub breakers: Arc<CircuitBreakerRegistry>,
}

impl AppState {
    pub fn new(
        query_service: Arc<QueryService>,
        stats: Arc<StatsAggregator>,
        breakers: Arc<CircuitBreakerRegistry>,
    ) -> Self {
        Self {
            query_service,
            stats,
            breakers,
        }
    }
}
