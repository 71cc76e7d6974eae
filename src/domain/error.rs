use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Circuit '{name}' is open")]
    CircuitOpen { name: String },

    #[error("Provider unavailable: {provider} - {message}")]
    Unavailable { provider: String, message: String },

    #[error("Provider throttled: {provider} - {message}")]
    Throttled { provider: String, message: String },

    #[error("Store error: {message}")]
    Store { message: String },

    #[error("Embedding error: {message}")]
    Embedding { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn circuit_open(name: impl Into<String>) -> Self {
        Self::CircuitOpen { name: name.into() }
    }

    pub fn unavailable(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unavailable {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn throttled(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Throttled {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error came from a circuit breaker rather than the
    /// dependency itself.
    pub fn is_circuit_open(&self) -> bool {
        matches!(self, Self::CircuitOpen { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let error = DomainError::validation("query must not be empty");
        assert_eq!(
            error.to_string(),
            "Validation error: query must not be empty"
        );
    }

    #[test]
    fn test_circuit_open_display() {
        let error = DomainError::circuit_open("store");
        assert_eq!(error.to_string(), "Circuit 'store' is open");
        assert!(error.is_circuit_open());
    }

    #[test]
    fn test_dependency_errors_stay_distinct() {
        let unavailable = DomainError::unavailable("openai", "connection refused");
        let throttled = DomainError::throttled("openai", "rate limit exceeded");

        assert!(!unavailable.is_circuit_open());
        assert!(matches!(unavailable, DomainError::Unavailable { .. }));
        assert!(matches!(throttled, DomainError::Throttled { .. }));
    }
}
