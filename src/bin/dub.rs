//! Command-line dubbing client.
//!
//! Uploads a video, then polls the job until the requested locale is ready.
//!
//! Usage:
//!   dub <video-path> [locale]
//!
//! Reads the same environment (or `.env`) as the server. Prints the final
//! poll state as JSON and exits non-zero unless the dub completed.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use learn_audibly::config::AppConfig;
use learn_audibly::services::dub::{DubClient, DubUpload, DEFAULT_LOCALE};
use learn_audibly::services::poller::{DubPoller, PollPolicy, PollState, TokioClock};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next().map(PathBuf::from) else {
        eprintln!("usage: dub <video-path> [locale]");
        return ExitCode::from(2);
    };
    let locale = args.next().unwrap_or_else(|| DEFAULT_LOCALE.to_string());

    let config = AppConfig::from_env().expect("Failed to load configuration");

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Failed to read video");
            return ExitCode::FAILURE;
        }
    };

    let http = reqwest::Client::builder()
        .timeout(config.request_timeout())
        .build()
        .expect("Failed to build HTTP client");
    let client = Arc::new(DubClient::new(
        http,
        &config.murf_base_url,
        &config.murf_dub_api_key,
    ));

    let upload = DubUpload {
        bytes,
        file_name: path.file_name().map(|n| n.to_string_lossy().into_owned()),
    };

    let job = match client.submit(upload, &locale).await {
        Ok(job) => job,
        Err(e) => {
            tracing::error!(error = %e, "Dub submission failed");
            return ExitCode::FAILURE;
        }
    };

    let policy = PollPolicy::from_config(&config);
    tracing::info!(
        job_id = %job.job_id(),
        interval_secs = policy.interval.as_secs(),
        max_attempts = policy.max_attempts,
        "Polling dub job"
    );

    let state = DubPoller::new(job, client, TokioClock, policy).run().await;

    match serde_json::to_string_pretty(&state) {
        Ok(json) => println!("{}", json),
        Err(e) => tracing::error!(error = %e, "Failed to serialize poll state"),
    }

    if matches!(state, PollState::Done { .. }) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
