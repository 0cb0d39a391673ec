use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::app_state::AppState;
use crate::models::translation::{TranslateRequest, TranslateResponse};
use crate::routes::error::{ApiError, RelayMessages};

const TRANSLATE_MESSAGES: RelayMessages = RelayMessages {
    invalid: "Missing or invalid input",
    failed: "Translation failed",
};

/// POST /api/translate — Translate a batch of texts into one target language.
pub async fn translate(
    State(state): State<AppState>,
    payload: Result<Json<TranslateRequest>, JsonRejection>,
) -> Result<Json<TranslateResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::from_json_rejection(e, TRANSLATE_MESSAGES))?;

    let result = state
        .murf
        .translate(&req)
        .await
        .map_err(|e| ApiError::from_relay(e, TRANSLATE_MESSAGES))?;

    Ok(Json(TranslateResponse { result }))
}
