//! Generation provider contract

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::DomainError;

/// Trait for the external answer-generation service.
///
/// Fails with [`DomainError::Unavailable`] for dependency-level failures and
/// [`DomainError::Throttled`] for rate limiting; the two map to different
/// caller-visible outcomes and must stay distinct.
#[async_trait]
pub trait GenerationProvider: Send + Sync + Debug {
    /// Produce an answer for the query.
    async fn complete(&self, query: &str) -> Result<String, DomainError>;
}
