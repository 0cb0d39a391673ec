use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use crate::services::relay::RelayError;

/// `{ error, details? }` envelope returned by every failing route.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

/// Caller-facing messages for one relayed capability.
#[derive(Debug, Clone, Copy)]
pub struct RelayMessages {
    /// Used when input validation fails.
    pub invalid: &'static str,
    /// Used when the upstream call fails.
    pub failed: &'static str,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                error: error.into(),
                details: None,
            },
        }
    }

    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    pub fn internal(error: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error)
    }

    pub fn with_details(mut self, details: impl Into<Value>) -> Self {
        self.body.details = Some(details.into());
        self
    }

    /// Map a relay failure onto the envelope. Remote statuses and bodies pass through.
    pub fn from_relay(err: RelayError, messages: RelayMessages) -> Self {
        match err {
            RelayError::Validation(report) => {
                Self::bad_request(messages.invalid).with_details(report)
            }
            RelayError::Remote { status, body } => {
                Self::new(status, messages.failed).with_details(body)
            }
            RelayError::Transport(e) => Self::internal("Server error").with_details(e.to_string()),
        }
    }

    /// Malformed JSON bodies are treated like missing fields.
    pub fn from_json_rejection(rejection: JsonRejection, messages: RelayMessages) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Rejected request body");
        Self::bad_request(messages.invalid).with_details(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
