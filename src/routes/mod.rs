use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::app_state::AppState;

pub mod dub;
pub mod error;
pub mod health;
pub mod metrics;
pub mod pdf;
pub mod speech;
pub mod summarize;
pub mod translate;
pub mod upload;

/// API routes. `/metrics` and the tower layers are added by the server binary.
pub fn router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/convert", post(speech::generate_speech))
        .route("/api/translate", post(translate::translate))
        .route("/api/summarize", post(summarize::summarize))
        .route("/api/extract-text", post(pdf::extract_text))
        .route("/api/pdf-parse-to-speech", post(pdf::pdf_to_speech))
        .route("/api/murfdub", post(dub::create_job))
        .route("/api/murfdub/status", get(dub::job_status))
        .route("/api/murfdub/wait", get(dub::wait_for_job))
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}
