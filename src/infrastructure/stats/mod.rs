//! Process-wide request statistics
//!
//! Counters and latency accumulators for the reporting endpoint. Every
//! request lands as one atomic update behind a single mutex, so hit/miss
//! totals can never drift from the query total.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::Serialize;

use crate::domain::{DomainError, TemporalClass};

/// How a request was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleOutcome {
    Hit,
    Miss,
    Error(ErrorKind),
}

/// Error kinds tracked separately in the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Unavailable,
    Throttled,
    CircuitOpen,
    Other,
}

impl ErrorKind {
    pub fn of(error: &DomainError) -> ErrorKind {
        match error {
            DomainError::Unavailable { .. } => ErrorKind::Unavailable,
            DomainError::Throttled { .. } => ErrorKind::Throttled,
            DomainError::CircuitOpen { .. } => ErrorKind::CircuitOpen,
            _ => ErrorKind::Other,
        }
    }
}

/// One request's contribution to the aggregate, recorded exactly once.
#[derive(Debug, Clone)]
pub struct RequestSample {
    pub outcome: SampleOutcome,
    pub temporal_class: TemporalClass,
    pub topic: String,
    pub cache_ms: Option<f64>,
    pub generation_ms: Option<f64>,
    pub total_ms: f64,
}

#[derive(Debug, Default)]
struct StatsInner {
    total_queries: u64,
    cache_hits: u64,
    cache_misses: u64,
    generation_calls: u64,
    errors: ErrorCounters,
    cache_latency_ms: f64,
    generation_latency_ms: f64,
    total_latency_ms: f64,
    classes: HashMap<TemporalClass, ClassCounters>,
    topics: HashMap<String, TopicCounters>,
}

#[derive(Debug, Default, Clone, Serialize)]
struct ErrorCounters {
    unavailable: u64,
    throttled: u64,
    circuit_open: u64,
    other: u64,
}

#[derive(Debug, Default, Clone, Serialize)]
struct ClassCounters {
    queries: u64,
    hits: u64,
    total_latency_ms: f64,
}

#[derive(Debug, Default, Clone, Serialize)]
struct TopicCounters {
    queries: u64,
    hits: u64,
}

/// Point-in-time statistics with derived rates and averages.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub total_queries: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub hit_rate_percent: f64,
    pub generation_calls: u64,
    errors: ErrorCounters,
    pub latency: LatencySnapshot,
    query_types: HashMap<String, ClassSnapshot>,
    topics: HashMap<String, TopicCounters>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LatencySnapshot {
    pub avg_total_ms: f64,
    pub avg_cache_ms: f64,
    pub avg_generation_ms: f64,
}

#[derive(Debug, Clone, Serialize)]
struct ClassSnapshot {
    queries: u64,
    hits: u64,
    avg_total_ms: f64,
}

impl StatsSnapshot {
    pub fn error_total(&self) -> u64 {
        self.errors.unavailable + self.errors.throttled + self.errors.circuit_open
            + self.errors.other
    }
}

/// Thread-safe statistics aggregator shared by all request handlers.
#[derive(Debug, Default)]
pub struct StatsAggregator {
    inner: Mutex<StatsInner>,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one finished request into the aggregate.
    pub fn record(&self, sample: RequestSample) {
        let mut inner = self.inner.lock().expect("stats lock poisoned");

        inner.total_queries += 1;
        inner.total_latency_ms += sample.total_ms;

        let hit = matches!(sample.outcome, SampleOutcome::Hit);

        // Cache latency feeds avg_cache_ms, which is the mean hit-path
        // lookup time; a miss's lookup time must not dilute it.
        if hit {
            if let Some(cache_ms) = sample.cache_ms {
                inner.cache_latency_ms += cache_ms;
            }
        }
        if let Some(generation_ms) = sample.generation_ms {
            inner.generation_latency_ms += generation_ms;
        }

        match sample.outcome {
            SampleOutcome::Hit => inner.cache_hits += 1,
            SampleOutcome::Miss => {
                inner.cache_misses += 1;
                inner.generation_calls += 1;
            }
            SampleOutcome::Error(kind) => {
                inner.cache_misses += 1;
                inner.generation_calls += 1;
                match kind {
                    ErrorKind::Unavailable => inner.errors.unavailable += 1,
                    ErrorKind::Throttled => inner.errors.throttled += 1,
                    ErrorKind::CircuitOpen => inner.errors.circuit_open += 1,
                    ErrorKind::Other => inner.errors.other += 1,
                }
            }
        }

        let class = inner.classes.entry(sample.temporal_class).or_default();
        class.queries += 1;
        class.total_latency_ms += sample.total_ms;
        if hit {
            class.hits += 1;
        }

        let topic = inner.topics.entry(sample.topic).or_default();
        topic.queries += 1;
        if hit {
            topic.hits += 1;
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let inner = self.inner.lock().expect("stats lock poisoned");

        let hit_rate_percent = if inner.total_queries > 0 {
            inner.cache_hits as f64 / inner.total_queries as f64 * 100.0
        } else {
            0.0
        };

        let latency = LatencySnapshot {
            avg_total_ms: average(inner.total_latency_ms, inner.total_queries),
            avg_cache_ms: average(inner.cache_latency_ms, inner.cache_hits),
            avg_generation_ms: average(inner.generation_latency_ms, inner.generation_calls),
        };

        let query_types = inner
            .classes
            .iter()
            .map(|(class, counters)| {
                (
                    class.as_str().to_string(),
                    ClassSnapshot {
                        queries: counters.queries,
                        hits: counters.hits,
                        avg_total_ms: average(counters.total_latency_ms, counters.queries),
                    },
                )
            })
            .collect();

        StatsSnapshot {
            total_queries: inner.total_queries,
            cache_hits: inner.cache_hits,
            cache_misses: inner.cache_misses,
            hit_rate_percent: round2(hit_rate_percent),
            generation_calls: inner.generation_calls,
            errors: inner.errors.clone(),
            latency,
            query_types,
            topics: inner.topics.clone(),
        }
    }

    /// Zero every counter atomically. Never touches circuit or policy state.
    pub fn reset(&self) {
        let mut inner = self.inner.lock().expect("stats lock poisoned");
        *inner = StatsInner::default();
    }
}

fn average(sum_ms: f64, count: u64) -> f64 {
    if count == 0 {
        return 0.0;
    }
    round2(sum_ms / count as f64)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
