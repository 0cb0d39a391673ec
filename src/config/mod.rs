use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:3000"). Unused by the `dub` CLI.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Murf API key for speech generation and translation
    pub murf_api_key: String,

    /// Murf API key for the dubbing endpoints
    pub murf_dub_api_key: String,

    /// Google Gemini API key for summarization
    pub gemini_api_key: String,

    #[serde(default = "default_murf_base_url")]
    pub murf_base_url: String,

    #[serde(default = "default_gemini_base_url")]
    pub gemini_base_url: String,

    /// Gemini model used for summaries
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    /// Timeout applied to every outbound request, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Delay between dub status polls, in seconds
    #[serde(default = "default_dub_poll_interval_secs")]
    pub dub_poll_interval_secs: u64,

    /// Number of status polls before a dub wait gives up
    #[serde(default = "default_dub_max_poll_attempts")]
    pub dub_max_poll_attempts: u32,

    /// Maximum accepted request body (PDF and video uploads), in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_murf_base_url() -> String {
    "https://api.murf.ai".to_string()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_gemini_model() -> String {
    "gemini-1.5-flash-latest".to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_dub_poll_interval_secs() -> u64 {
    10
}

fn default_dub_max_poll_attempts() -> u32 {
    60
}

fn default_max_upload_bytes() -> usize {
    100 * 1024 * 1024
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn dub_poll_interval(&self) -> Duration {
        Duration::from_secs(self.dub_poll_interval_secs)
    }
}
