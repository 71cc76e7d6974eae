use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::health;
use super::routes::{query, stats};
use super::state::AppState;

/// Create the full router with application state
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/live", get(health::live_check))
        .route("/api/query", post(query::query))
        .route("/api/stats", get(stats::get_stats))
        .route("/api/stats/reset", post(stats::reset_stats))
        .route("/api/circuits", get(stats::get_circuits))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::util::ServiceExt;

    use super::*;
    use crate::domain::embedding::mock::MockEmbeddingProvider;
    use crate::domain::generation::mock::{MockFailure, MockGenerationProvider};
    use crate::infrastructure::resilience::{
        CircuitBreakerConfig, CircuitBreakerRegistry, GENERATION_CIRCUIT, STORE_CIRCUIT,
    };
    use crate::infrastructure::services::{GenerationClient, QueryService, VectorCacheClient};
    use crate::infrastructure::stats::StatsAggregator;
    use crate::infrastructure::vector_store::InMemoryVectorStore;

    fn test_state(generation: MockGenerationProvider) -> AppState {
        let mut registry = CircuitBreakerRegistry::new();
        let store_breaker = registry.register(
            STORE_CIRCUIT,
            CircuitBreakerConfig {
                failure_threshold: 3,
                recovery_timeout: Duration::from_secs(10),
            },
        );
        let generation_breaker = registry.register(
            GENERATION_CIRCUIT,
            CircuitBreakerConfig {
                failure_threshold: 3,
                recovery_timeout: Duration::from_secs(30),
            },
        );

        let stats = Arc::new(StatsAggregator::new());
        let query_service = QueryService::new(
            Arc::new(MockEmbeddingProvider::new(2)),
            VectorCacheClient::new(Arc::new(InMemoryVectorStore::new()), store_breaker),
            GenerationClient::new(Arc::new(generation), generation_breaker),
            stats.clone(),
        );

        AppState::new(Arc::new(query_service), stats, Arc::new(registry))
    }

    fn json_request(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_router(test_state(MockGenerationProvider::answering("x")));

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "healthy");
    }

    #[tokio::test]
    async fn test_query_miss_then_stats() {
        let app = create_router(test_state(MockGenerationProvider::answering("Paris")));

        let response = app
            .clone()
            .oneshot(json_request(
                "/api/query",
                serde_json::json!({"query": "What is the capital of France?"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["answer"], "Paris");
        assert_eq!(json["metadata"]["source"], "generation");
        assert_eq!(json["metadata"]["temporal_class"], "evergreen");
        assert_eq!(json["metadata"]["topic"], "geography");

        let response = app
            .oneshot(Request::get("/api/stats").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["total_queries"], 1);
        assert_eq!(json["cache_misses"], 1);
    }

    #[tokio::test]
    async fn test_identical_query_hits_on_second_request() {
        let app = create_router(test_state(MockGenerationProvider::answering("Paris")));
        let body = serde_json::json!({"query": "What is the capital of France?"});

        let first = app
            .clone()
            .oneshot(json_request("/api/query", body.clone()))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = app
            .oneshot(json_request("/api/query", body))
            .await
            .unwrap();
        let json = body_json(second).await;
        assert_eq!(json["metadata"]["source"], "cache");
        assert_eq!(json["metadata"]["similarity"], 1.0);
    }

    #[tokio::test]
    async fn test_empty_query_is_bad_request() {
        let app = create_router(test_state(MockGenerationProvider::answering("x")));

        let response = app
            .oneshot(json_request(
                "/api/query",
                serde_json::json!({"query": "   "}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["type"], "invalid_request_error");
    }

    #[tokio::test]
    async fn test_throttled_generation_returns_429() {
        let app = create_router(test_state(MockGenerationProvider::failing(
            MockFailure::Throttled,
        )));

        let response = app
            .oneshot(json_request(
                "/api/query",
                serde_json::json!({"query": "anything"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_unavailable_generation_returns_502() {
        let app = create_router(test_state(MockGenerationProvider::failing(
            MockFailure::Unavailable,
        )));

        let response = app
            .oneshot(json_request(
                "/api/query",
                serde_json::json!({"query": "anything"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_circuits_endpoint_reports_both_breakers() {
        let app = create_router(test_state(MockGenerationProvider::answering("x")));

        let response = app
            .oneshot(Request::get("/api/circuits").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let circuits = json["circuits"].as_array().unwrap();
        assert_eq!(circuits.len(), 2);
        assert_eq!(circuits[0]["name"], "store");
        assert_eq!(circuits[0]["state"], "closed");
        assert_eq!(circuits[1]["name"], "generation");
    }

    #[tokio::test]
    async fn test_stats_reset_endpoint() {
        let app = create_router(test_state(MockGenerationProvider::answering("x")));

        app.clone()
            .oneshot(json_request(
                "/api/query",
                serde_json::json!({"query": "some question"}),
            ))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(
                Request::post("/api/stats/reset")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::get("/api/stats").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["total_queries"], 0);
    }

    #[tokio::test]
    async fn test_malformed_json_returns_structured_error() {
        let app = create_router(test_state(MockGenerationProvider::answering("x")));

        let response = app
            .oneshot(
                Request::post("/api/query")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response.status().is_client_error());
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "json_parse_error");
    }
}
