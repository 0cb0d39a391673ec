use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::{
    dub::DubClient, gemini::GeminiClient, murf::MurfClient, pdf::PdfExtractor,
    poller::PollRegistry,
};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub murf: Arc<MurfClient>,
    pub gemini: Arc<GeminiClient>,
    pub dub: Arc<DubClient>,
    pub pdf: Arc<PdfExtractor>,
    pub polls: Arc<PollRegistry>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        murf: MurfClient,
        gemini: GeminiClient,
        dub: DubClient,
        pdf: PdfExtractor,
    ) -> Self {
        Self {
            config: Arc::new(config),
            murf: Arc::new(murf),
            gemini: Arc::new(gemini),
            dub: Arc::new(dub),
            pdf: Arc::new(pdf),
            polls: Arc::new(PollRegistry::default()),
        }
    }

    /// Build every upstream client from `config`, sharing one HTTP connection pool.
    pub fn from_config(config: AppConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("learn-audibly/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let murf = MurfClient::new(http.clone(), &config.murf_base_url, &config.murf_api_key);
        let gemini = GeminiClient::new(
            http.clone(),
            &config.gemini_base_url,
            &config.gemini_model,
            &config.gemini_api_key,
        );
        let dub = DubClient::new(http, &config.murf_base_url, &config.murf_dub_api_key);

        Ok(Self::new(config, murf, gemini, dub, PdfExtractor::new()))
    }
}
