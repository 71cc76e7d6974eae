//! Query endpoint

use axum::extract::State;
use tracing::{info_span, Instrument};
use uuid::Uuid;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, QueryRequest, QueryResponse};

/// `POST /api/query`
///
/// Answers a query from the semantic cache when a close enough entry
/// exists, generating and caching otherwise.
pub async fn query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    if request.query.trim().is_empty() {
        return Err(ApiError::bad_request("query must not be empty"));
    }

    let request_id = Uuid::new_v4();
    let span = info_span!("query", %request_id);

    let outcome = state
        .query_service
        .handle(&request.query, request.force_refresh)
        .instrument(span)
        .await?;

    Ok(Json(QueryResponse::from(outcome)))
}
