use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::app_state::AppState;
use crate::models::speech::{SpeechRequest, SpeechResponse};
use crate::routes::error::{ApiError, RelayMessages};

pub(crate) const SPEECH_MESSAGES: RelayMessages = RelayMessages {
    invalid: "Missing text or voiceId",
    failed: "Murf API failed",
};

/// POST /api/convert — Turn text into speech with a Murf voice.
pub async fn generate_speech(
    State(state): State<AppState>,
    payload: Result<Json<SpeechRequest>, JsonRejection>,
) -> Result<Json<SpeechResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::from_json_rejection(e, SPEECH_MESSAGES))?;

    let response = state
        .murf
        .generate_speech(&req)
        .await
        .map_err(|e| ApiError::from_relay(e, SPEECH_MESSAGES))?;

    Ok(Json(response))
}
