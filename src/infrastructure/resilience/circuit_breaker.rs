//! Circuit breaker guarding calls to one external dependency
//!
//! Gates calls and records outcomes; it never retries. Recovery is evaluated
//! lazily when a call is attempted, not by a timer.

use std::future::Future;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{info, warn};

use crate::domain::DomainError;

/// Circuit breaker states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

/// Breaker tuning per guarded dependency.
#[derive(Debug, Clone, Copy)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before the circuit opens.
    pub failure_threshold: u32,
    /// How long the circuit stays open before admitting a trial call.
    pub recovery_timeout: Duration,
}

/// Point-in-time breaker status for the reporting endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct CircuitBreakerStatus {
    pub name: String,
    pub state: CircuitState,
    pub failure_count: u32,
    pub failure_threshold: u32,
    pub recovery_timeout_seconds: u64,
}

#[derive(Debug)]
struct BreakerInner {
    state: CircuitState,
    failure_count: u32,
    opened_at: Option<Instant>,
    trial_in_flight: bool,
}

/// Circuit breaker for a single named dependency.
///
/// State lives behind one mutex; critical sections are short and never held
/// across an await point.
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerInner>,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            inner: Mutex::new(BreakerInner {
                state: CircuitState::Closed,
                failure_count: 0,
                opened_at: None,
                trial_in_flight: false,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run `operation` if the circuit admits it, recording the outcome.
    ///
    /// Returns [`DomainError::CircuitOpen`] without touching the dependency
    /// when the circuit is open, or the operation's own error on failure.
    pub async fn execute<T, F, Fut>(&self, operation: F) -> Result<T, DomainError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, DomainError>>,
    {
        self.try_acquire()?;

        match operation().await {
            Ok(value) => {
                self.record_success();
                Ok(value)
            }
            Err(error) => {
                self.record_failure();
                Err(error)
            }
        }
    }

    /// Admit or reject a call. While half-open, exactly one trial may be in
    /// flight; concurrent callers are rejected as if the circuit were still
    /// open so a single trial failure cannot be amplified by a herd.
    fn try_acquire(&self) -> Result<(), DomainError> {
        let mut inner = self.inner.lock().expect("breaker lock poisoned");

        match inner.state {
            CircuitState::Closed => Ok(()),
            CircuitState::Open => {
                let elapsed = inner
                    .opened_at
                    .map(|at| at.elapsed())
                    .unwrap_or(self.config.recovery_timeout);

                if elapsed >= self.config.recovery_timeout {
                    inner.state = CircuitState::HalfOpen;
                    inner.trial_in_flight = true;
                    info!(circuit = %self.name, "circuit entering half-open, admitting trial call");
                    Ok(())
                } else {
                    Err(DomainError::circuit_open(&self.name))
                }
            }
            CircuitState::HalfOpen => {
                if inner.trial_in_flight {
                    Err(DomainError::circuit_open(&self.name))
                } else {
                    inner.trial_in_flight = true;
                    Ok(())
                }
            }
        }
    }

    fn record_success(&self) {
        let mut inner = self.inner.lock().expect("breaker lock poisoned");

        if inner.state == CircuitState::HalfOpen {
            info!(circuit = %self.name, "trial call succeeded, circuit closed");
        }

        inner.state = CircuitState::Closed;
        inner.failure_count = 0;
        inner.opened_at = None;
        inner.trial_in_flight = false;
    }

    fn record_failure(&self) {
        let mut inner = self.inner.lock().expect("breaker lock poisoned");

        match inner.state {
            CircuitState::HalfOpen => {
                inner.state = CircuitState::Open;
                inner.opened_at = Some(Instant::now());
                inner.trial_in_flight = false;
                warn!(circuit = %self.name, "trial call failed, circuit re-opened");
            }
            CircuitState::Closed => {
                inner.failure_count += 1;

                if inner.failure_count >= self.config.failure_threshold {
                    inner.state = CircuitState::Open;
                    inner.opened_at = Some(Instant::now());
                    warn!(
                        circuit = %self.name,
                        failures = inner.failure_count,
                        "failure threshold reached, circuit opened"
                    );
                }
            }
            CircuitState::Open => {
                // A call admitted before the circuit opened may still report
                // its failure here; keep opened_at from the original trip.
                inner.failure_count += 1;
            }
        }
    }

    /// Current state as stored; does not evaluate recovery.
    pub fn state(&self) -> CircuitState {
        self.inner.lock().expect("breaker lock poisoned").state
    }

    pub fn status(&self) -> CircuitBreakerStatus {
        let inner = self.inner.lock().expect("breaker lock poisoned");

        CircuitBreakerStatus {
            name: self.name.clone(),
            state: inner.state,
            failure_count: inner.failure_count,
            failure_threshold: self.config.failure_threshold,
            recovery_timeout_seconds: self.config.recovery_timeout.as_secs(),
        }
    }
}
