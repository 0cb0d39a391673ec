use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::app_state::AppState;
use crate::models::summary::{SummarizeRequest, SummarizeResponse};
use crate::routes::error::{ApiError, RelayMessages};

const SUMMARIZE_MESSAGES: RelayMessages = RelayMessages {
    invalid: "Missing text",
    failed: "Failed to summarize.",
};

/// POST /api/summarize
pub async fn summarize(
    State(state): State<AppState>,
    payload: Result<Json<SummarizeRequest>, JsonRejection>,
) -> Result<Json<SummarizeResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::from_json_rejection(e, SUMMARIZE_MESSAGES))?;

    let response = state
        .gemini
        .summarize(&req)
        .await
        .map_err(|e| ApiError::from_relay(e, SUMMARIZE_MESSAGES))?;

    Ok(Json(response))
}
