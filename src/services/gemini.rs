use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::models::summary::{SummarizeRequest, SummarizeResponse};
use crate::services::relay::{relay, RelayAuth, RelayError, RelaySpec};

/// Client for Gemini `generateContent`, used for summaries.
pub struct GeminiClient {
    http: Client,
    summarize: RelaySpec<SummarizeRequest, SummarizeResponse>,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

impl GeminiClient {
    pub fn new(http: Client, base_url: &str, model: &str, api_key: &str) -> Self {
        let model = model.trim_start_matches("models/");
        Self {
            http,
            summarize: RelaySpec {
                capability: "summarize",
                url: format!(
                    "{}/v1beta/models/{}:generateContent",
                    base_url.trim_end_matches('/'),
                    model
                ),
                auth: RelayAuth {
                    header: "x-goog-api-key",
                    key: api_key.to_string(),
                },
                payload: summary_prompt,
                success: |body| body.get("candidates").is_some_and(Value::is_array),
                extract: extract_summary,
            },
        }
    }

    pub async fn summarize(&self, req: &SummarizeRequest) -> Result<SummarizeResponse, RelayError> {
        tracing::debug!(chars = req.text.len(), "Requesting summary");
        relay(&self.http, &self.summarize, req).await
    }
}

fn summary_prompt(req: &SummarizeRequest) -> Value {
    serde_json::json!({
        "contents": [{
            "parts": [{ "text": format!("Summarize this:\n\n{}", req.text) }]
        }]
    })
}

/// Text of the first candidate, or nothing when the model returned no text.
fn extract_summary(body: &Value) -> Option<SummarizeResponse> {
    let response = GenerateContentResponse::deserialize(body).ok()?;
    let content = response.candidates.into_iter().next()?.content?;

    let summary: String = content
        .parts
        .into_iter()
        .filter_map(|p| p.text)
        .collect::<Vec<_>>()
        .join("");

    if summary.trim().is_empty() {
        return None;
    }
    Some(SummarizeResponse { summary })
}
