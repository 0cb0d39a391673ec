use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::models::speech::{SpeechRequest, SpeechResponse};
use crate::models::translation::{TranslateRequest, TranslationResult};
use crate::services::relay::{relay, RelayAuth, RelayError, RelaySpec};

/// Client for the Murf speech and translation endpoints.
pub struct MurfClient {
    http: Client,
    speech: RelaySpec<SpeechRequest, SpeechResponse>,
    translate: RelaySpec<TranslateRequest, TranslationResult>,
}

impl MurfClient {
    pub fn new(http: Client, base_url: &str, api_key: &str) -> Self {
        let base_url = base_url.trim_end_matches('/');
        let auth = RelayAuth {
            header: "api-key",
            key: api_key.to_string(),
        };

        Self {
            http,
            speech: RelaySpec {
                capability: "speech",
                url: format!("{}/v1/speech/generate", base_url),
                auth: auth.clone(),
                payload: |req| serde_json::to_value(req).unwrap_or(Value::Null),
                success: |body| body.get("audioFile").is_some(),
                extract: extract_audio_url,
            },
            translate: RelaySpec {
                capability: "translate",
                url: format!("{}/v1/text/translate", base_url),
                auth,
                payload: |req| serde_json::to_value(req).unwrap_or(Value::Null),
                success: |body| body.get("translations").is_some_and(Value::is_array),
                extract: |body| TranslationResult::deserialize(body).ok(),
            },
        }
    }

    /// Generate speech for `req.text` and return the hosted audio URL.
    pub async fn generate_speech(&self, req: &SpeechRequest) -> Result<SpeechResponse, RelayError> {
        tracing::debug!(voice_id = %req.voice_id, chars = req.text.len(), "Requesting speech");
        relay(&self.http, &self.speech, req).await
    }

    /// Translate every entry of `req.texts` into `req.target_language`.
    pub async fn translate(&self, req: &TranslateRequest) -> Result<TranslationResult, RelayError> {
        tracing::debug!(
            target_language = %req.target_language,
            count = req.texts.len(),
            "Requesting translation"
        );
        relay(&self.http, &self.translate, req).await
    }
}

fn extract_audio_url(body: &Value) -> Option<SpeechResponse> {
    body.get("audioFile")
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty())
        .map(|url| SpeechResponse {
            audio_url: url.to_string(),
        })
}
