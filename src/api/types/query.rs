//! Request and response types for the query endpoint

use serde::{Deserialize, Serialize};

use crate::domain::{Classification, TemporalClass};
use crate::infrastructure::services::{QueryOutcome, ResponseSource};

/// Body of `POST /api/query`
#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    /// Skip the cache lookup and regenerate. Accepts both snake and camel
    /// case for client compatibility.
    #[serde(default, alias = "forceRefresh")]
    pub force_refresh: bool,
}

/// Body of a successful query response
#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    pub answer: String,
    pub metadata: QueryMetadata,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryMetadata {
    pub source: ResponseSource,
    pub temporal_class: TemporalClass,
    pub topic: String,
    pub confidence: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
}

impl From<QueryOutcome> for QueryResponse {
    fn from(outcome: QueryOutcome) -> Self {
        let Classification {
            temporal_class,
            topic,
            confidence,
        } = outcome.classification;

        Self {
            answer: outcome.answer,
            metadata: QueryMetadata {
                source: outcome.source,
                temporal_class,
                topic,
                confidence,
                similarity: outcome.similarity.map(f64::from),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_accepts_camel_case_alias() {
        let request: QueryRequest =
            serde_json::from_str(r#"{"query": "q", "forceRefresh": true}"#).unwrap();
        assert!(request.force_refresh);

        let request: QueryRequest =
            serde_json::from_str(r#"{"query": "q", "force_refresh": true}"#).unwrap();
        assert!(request.force_refresh);
    }

    #[test]
    fn test_force_refresh_defaults_to_false() {
        let request: QueryRequest = serde_json::from_str(r#"{"query": "q"}"#).unwrap();
        assert!(!request.force_refresh);
    }

    #[test]
    fn test_cache_hit_response_shape() {
        let response = QueryResponse {
            answer: "Paris".to_string(),
            metadata: QueryMetadata {
                source: ResponseSource::Cache,
                temporal_class: TemporalClass::Evergreen,
                topic: "geography".to_string(),
                confidence: 0.6,
                similarity: Some(0.82),
            },
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["metadata"]["source"], "cache");
        assert_eq!(json["metadata"]["temporal_class"], "evergreen");
        assert_eq!(json["metadata"]["similarity"], 0.82);
    }

    #[test]
    fn test_miss_response_omits_similarity() {
        let response = QueryResponse {
            answer: "Sunny".to_string(),
            metadata: QueryMetadata {
                source: ResponseSource::Generation,
                temporal_class: TemporalClass::TimeSensitive,
                topic: "weather".to_string(),
                confidence: 0.95,
                similarity: None,
            },
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["metadata"]["source"], "generation");
        assert!(json["metadata"].get("similarity").is_none());
    }
}
