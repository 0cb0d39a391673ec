use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;

use crate::models::job::{EmptyJobId, Job, StatusSnapshot};
use crate::services::poller::StatusSource;
use crate::services::relay::parse_body;

/// Locale used when a dub request does not name one.
pub const DEFAULT_LOCALE: &str = "fr_FR";

const DEFAULT_FILE_NAME: &str = "uploaded_video.mp4";

/// Client for the Murf dubbing API (job creation and status).
pub struct DubClient {
    http: Client,
    base_url: String,
    api_key: String,
}

#[derive(Deserialize)]
struct CreateJobResponse {
    job_id: Option<String>,
}

/// A video to dub.
#[derive(Debug, Clone)]
pub struct DubUpload {
    pub bytes: Vec<u8>,
    pub file_name: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum DubError {
    #[error("Dub submission failed: {0}")]
    Submission(String),

    #[error("Dub status request failed ({status}): {message}")]
    Status { status: StatusCode, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to parse dub status: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid dub API URL: {0}")]
    Url(String),
}

impl From<EmptyJobId> for DubError {
    fn from(e: EmptyJobId) -> Self {
        DubError::Submission(e.to_string())
    }
}

impl DubClient {
    pub fn new(http: Client, base_url: &str, api_key: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Submit a video for dubbing into `locale`. Failures are not retried.
    pub async fn submit(&self, upload: DubUpload, locale: &str) -> Result<Job, DubError> {
        let file_name = upload
            .file_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string());

        tracing::info!(
            file_name = %file_name,
            size_bytes = upload.bytes.len(),
            locale = %locale,
            "Submitting dub job"
        );

        let part = Part::bytes(upload.bytes)
            .file_name(file_name.clone())
            .mime_str("video/mp4")?;

        let form = Form::new()
            .part("file", part)
            .text("file_name", file_name)
            .text("priority", "LOW")
            .text("target_locales", locale.to_string());

        let response = self
            .http
            .post(format!("{}/v1/murfdub/jobs/create", self.base_url))
            .header("api-key", &self.api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = parse_body(&response.bytes().await?);

        if !status.is_success() {
            let message = error_message(&body).unwrap_or_else(|| "Dubbing failed.".to_string());
            tracing::error!(status = %status, error = %message, "Dub submission rejected");
            return Err(DubError::Submission(message));
        }

        let created = CreateJobResponse::deserialize(&body)
            .map_err(|_| DubError::Submission("Dubbing failed.".to_string()))?;
        let job = Job::new(created.job_id.unwrap_or_default(), locale)?;

        metrics::counter!("dub_jobs_submitted_total").increment(1);
        tracing::info!(job_id = %job.job_id(), locale = %locale, "Dub job created");

        Ok(job)
    }

    /// Fetch the raw status payload for `job_id`.
    pub async fn fetch_status(&self, job_id: &str) -> Result<Value, DubError> {
        let url = self.status_url(job_id)?;

        let response = self
            .http
            .get(url)
            .header("api-key", &self.api_key)
            .send()
            .await?;

        let status = response.status();
        let body = parse_body(&response.bytes().await?);

        if !status.is_success() {
            let message =
                error_message(&body).unwrap_or_else(|| "Failed to fetch status".to_string());
            return Err(DubError::Status { status, message });
        }

        tracing::debug!(job_id = %job_id, "Fetched dub status");
        Ok(body)
    }

    fn status_url(&self, job_id: &str) -> Result<Url, DubError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| DubError::Url(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| DubError::Url(self.base_url.clone()))?
            .pop_if_empty()
            .extend(["v1", "murfdub", "jobs", job_id, "status"]);
        Ok(url)
    }
}

#[async_trait]
impl StatusSource for DubClient {
    async fn snapshot(&self, job_id: &str) -> Result<StatusSnapshot, DubError> {
        let body = self.fetch_status(job_id).await?;
        Ok(serde_json::from_value(body)?)
    }
}

fn error_message(body: &Value) -> Option<String> {
    body.get("error_message")
        .or_else(|| body.get("errorMessage"))
        .and_then(Value::as_str)
        .map(str::to_string)
}
