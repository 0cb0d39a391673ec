//! Generic single-shot relay.
//!
//! Every synchronous capability (speech, translation, summarization) is one
//! [`RelaySpec`] pushed through [`relay`]: validate the caller's input, POST a
//! JSON payload to one upstream endpoint, then check and reshape the answer.
//! Nothing is retried or cached.

use std::time::Instant;

use garde::Validate;
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use serde_json::Value;

/// Header-based credential attached to every upstream call.
#[derive(Clone)]
pub struct RelayAuth {
    pub header: &'static str,
    pub key: String,
}

impl std::fmt::Debug for RelayAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayAuth")
            .field("header", &self.header)
            .field("key", &"***")
            .finish()
    }
}

/// One upstream capability.
///
/// Required input fields are expressed by the `garde` rules on `I`; the
/// remaining knobs are plain function pointers so a spec can be built once
/// and shared by every request.
pub struct RelaySpec<I, O> {
    pub capability: &'static str,
    pub url: String,
    pub auth: RelayAuth,
    /// Builds the upstream JSON body from validated input.
    pub payload: fn(&I) -> Value,
    /// Decides whether a 2xx body actually is a success.
    pub success: fn(&Value) -> bool,
    /// Pulls the caller-facing result out of a successful body.
    pub extract: fn(&Value) -> Option<O>,
}

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Upstream returned {status}")]
    Remote { status: StatusCode, body: Value },

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl RelayError {
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::Validation(_) => "validation",
            RelayError::Remote { .. } => "remote",
            RelayError::Transport(_) => "transport",
        }
    }
}

/// Validate `input` and forward it through `spec`.
pub async fn relay<I, O>(http: &Client, spec: &RelaySpec<I, O>, input: &I) -> Result<O, RelayError>
where
    I: Validate,
    I::Context: Default,
{
    if let Err(report) = input.validate() {
        metrics::counter!(
            "relay_failures_total",
            "capability" => spec.capability,
            "kind" => "validation"
        )
        .increment(1);
        return Err(RelayError::Validation(report.to_string()));
    }

    metrics::counter!("relay_requests_total", "capability" => spec.capability).increment(1);
    let start = Instant::now();

    let result = forward(http, spec, input).await;

    metrics::histogram!("relay_duration_seconds", "capability" => spec.capability)
        .record(start.elapsed().as_secs_f64());

    match &result {
        Ok(_) => tracing::info!(
            capability = spec.capability,
            duration_ms = start.elapsed().as_millis() as u64,
            "Relay call succeeded"
        ),
        Err(e) => {
            metrics::counter!(
                "relay_failures_total",
                "capability" => spec.capability,
                "kind" => e.kind()
            )
            .increment(1);
            tracing::error!(capability = spec.capability, error = %e, "Relay call failed");
        }
    }

    result
}

async fn forward<I, O>(http: &Client, spec: &RelaySpec<I, O>, input: &I) -> Result<O, RelayError> {
    let response = http
        .post(&spec.url)
        .header(spec.auth.header, &spec.auth.key)
        .header(ACCEPT, "application/json")
        .json(&(spec.payload)(input))
        .send()
        .await?;

    let status = response.status();
    let bytes = response.bytes().await?;
    let body = parse_body(&bytes);

    if !status.is_success() {
        return Err(RelayError::Remote { status, body });
    }

    if !(spec.success)(&body) {
        return Err(RelayError::Remote {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body,
        });
    }

    match (spec.extract)(&body) {
        Some(output) => Ok(output),
        None => Err(RelayError::Remote {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body,
        }),
    }
}

/// Upstream bodies are relayed verbatim; anything that is not JSON is kept as a string.
pub fn parse_body(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}
