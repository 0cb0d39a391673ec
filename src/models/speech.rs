use garde::Validate;
use serde::{Deserialize, Serialize};

/// Request to synthesize speech. Serialized as-is into the Murf payload.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SpeechRequest {
    #[garde(length(min = 1))]
    #[serde(default)]
    pub text: String,

    #[garde(length(min = 1))]
    #[serde(default)]
    pub voice_id: String,

    #[garde(skip)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SpeechResponse {
    pub audio_url: String,
}

/// Response of the PDF-to-speech route: the audio plus the text it was read from.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfSpeechResponse {
    pub audio_url: String,
    pub text: String,
}

/// Voice and style used when a PDF upload does not name one.
pub const DEFAULT_PDF_VOICE: &str = "en-US-natalie";
pub const DEFAULT_PDF_STYLE: &str = "Promo";
