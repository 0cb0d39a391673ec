use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::app_state::AppState;
use crate::models::speech::{
    PdfSpeechResponse, SpeechRequest, DEFAULT_PDF_STYLE, DEFAULT_PDF_VOICE,
};
use crate::routes::error::ApiError;
use crate::routes::speech::SPEECH_MESSAGES;
use crate::routes::upload::UploadForm;
use crate::services::pdf::PdfError;

#[derive(Serialize)]
pub struct ExtractTextResponse {
    pub text: String,
}

/// POST /api/extract-text — Pull the text layer out of an uploaded PDF.
pub async fn extract_text(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ExtractTextResponse>, ApiError> {
    let mut form = UploadForm::read(multipart).await?;
    let file = form.require_file()?;

    let text = state
        .pdf
        .extract_text(&file.bytes)
        .await
        .map_err(pdf_error)?;

    Ok(Json(ExtractTextResponse { text }))
}

/// POST /api/pdf-parse-to-speech — Read an uploaded PDF aloud.
pub async fn pdf_to_speech(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<PdfSpeechResponse>, ApiError> {
    let mut form = UploadForm::read(multipart).await?;
    let file = form
        .require_file()
        .map_err(|_| ApiError::bad_request("No file uploaded"))?;

    let text = state
        .pdf
        .extract_text(&file.bytes)
        .await
        .map_err(pdf_error)?
        .trim()
        .to_string();

    if text.is_empty() {
        return Err(ApiError::bad_request("No text extracted from PDF"));
    }

    let req = SpeechRequest {
        text,
        voice_id: form.field("voiceId").unwrap_or(DEFAULT_PDF_VOICE).to_string(),
        style: Some(form.field("style").unwrap_or(DEFAULT_PDF_STYLE).to_string()),
    };

    let speech = state
        .murf
        .generate_speech(&req)
        .await
        .map_err(|e| ApiError {
            // Every speech failure on this route is a 500, whatever Murf answered.
            status: StatusCode::INTERNAL_SERVER_ERROR,
            ..ApiError::from_relay(e, SPEECH_MESSAGES)
        })?;

    Ok(Json(PdfSpeechResponse {
        audio_url: speech.audio_url,
        text: req.text,
    }))
}

fn pdf_error(err: PdfError) -> ApiError {
    tracing::error!(error = %err, "PDF parse error");
    ApiError::internal("Failed to extract text from PDF.")
}
