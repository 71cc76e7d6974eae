//! Statistics and circuit inspection endpoints

use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::types::Json;
use crate::infrastructure::resilience::CircuitBreakerStatus;
use crate::infrastructure::stats::StatsSnapshot;

/// `GET /api/stats`
pub async fn get_stats(State(state): State<AppState>) -> Json<StatsSnapshot> {
    Json(state.stats.snapshot())
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub status: &'static str,
}

/// `POST /api/stats/reset`
///
/// Zeroes the counters. Circuit breaker state is untouched.
pub async fn reset_stats(State(state): State<AppState>) -> (StatusCode, Json<ResetResponse>) {
    state.stats.reset();
    (StatusCode::OK, Json(ResetResponse { status: "reset" }))
}

#[derive(Debug, Serialize)]
pub struct CircuitsResponse {
    pub circuits: Vec<CircuitBreakerStatus>,
}

/// `GET /api/circuits`
pub async fn get_circuits(State(state): State<AppState>) -> Json<CircuitsResponse> {
    Json(CircuitsResponse {
        circuits: state.breakers.statuses(),
    })
}
