use garde::Validate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TranslateRequest {
    #[garde(length(min = 1), inner(length(min = 1)))]
    #[serde(default)]
    pub texts: Vec<String>,

    #[garde(length(min = 1))]
    #[serde(default)]
    pub target_language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Translation {
    pub source_text: String,
    pub translated_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranslationResult {
    pub translations: Vec<Translation>,

    /// Everything else Murf returned (`metadata` etc.), passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub struct TranslateResponse {
    pub result: TranslationResult,
}
