use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::app_state::AppState;
use crate::models::job::Job;
use crate::routes::error::ApiError;
use crate::routes::upload::UploadForm;
use crate::services::dub::{DubError, DubUpload, DEFAULT_LOCALE};
use crate::services::poller::{DubPoller, PollPolicy, PollState, TokioClock};

#[derive(Serialize)]
pub struct CreateDubResponse {
    pub job_id: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    #[serde(rename = "jobId")]
    pub job_id: Option<String>,
    pub language: Option<String>,
}

#[derive(Serialize)]
pub struct WaitResponse {
    pub job_id: String,
    #[serde(flatten)]
    pub state: PollState,
}

/// POST /api/murfdub — Upload a video and start a dubbing job.
pub async fn create_job(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<CreateDubResponse>, ApiError> {
    let mut form = UploadForm::read(multipart).await?;
    let file = form.require_file()?;
    let locale = form.field("language").unwrap_or(DEFAULT_LOCALE).to_string();

    let upload = DubUpload {
        bytes: file.bytes,
        file_name: file.file_name,
    };

    let job = state.dub.submit(upload, &locale).await.map_err(|e| {
        tracing::error!(error = %e, "Murf dubbing error");
        match e {
            DubError::Submission(message) => ApiError::internal(message),
            _ => ApiError::internal("Dubbing failed."),
        }
    })?;

    Ok(Json(CreateDubResponse {
        job_id: job.job_id().to_string(),
    }))
}

/// GET /api/murfdub/status?jobId= — Raw status payload from the dubbing service.
pub async fn job_status(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<Value>, ApiError> {
    let job_id = require_job_id(&query)?;

    let payload = state.dub.fetch_status(job_id).await.map_err(|e| {
        tracing::error!(job_id = %job_id, error = %e, "Dubbing status error");
        match e {
            DubError::Status { message, .. } => ApiError::internal(message),
            _ => ApiError::internal("Failed to fetch status"),
        }
    })?;

    tracing::info!(job_id = %job_id, "Fetched dubbing status");
    Ok(Json(payload))
}

/// GET /api/murfdub/wait?jobId=&language= — Poll until the requested locale is dubbed.
///
/// Only one wait may run per job id. Dropping the request abandons the poll.
pub async fn wait_for_job(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Result<(StatusCode, Json<WaitResponse>), ApiError> {
    let job_id = require_job_id(&query)?;
    let locale = query
        .language
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or(DEFAULT_LOCALE);

    let job = Job::new(job_id, locale).map_err(|_| ApiError::bad_request("Missing jobId"))?;

    let _lease = state.polls.acquire(job_id).ok_or_else(|| {
        ApiError::new(
            StatusCode::CONFLICT,
            "A status poll is already running for this job",
        )
    })?;

    let policy = PollPolicy::from_config(&state.config);
    tracing::info!(
        job_id = %job_id,
        locale = %locale,
        interval_secs = policy.interval.as_secs(),
        max_attempts = policy.max_attempts,
        "Waiting for dub job"
    );

    let final_state = DubPoller::new(job, state.dub.clone(), TokioClock, policy)
        .run()
        .await;

    let status = match &final_state {
        PollState::Done { .. } => StatusCode::OK,
        PollState::Failed { .. } => StatusCode::BAD_GATEWAY,
        PollState::TimedOut { .. } => StatusCode::GATEWAY_TIMEOUT,
        PollState::Waiting { .. } => StatusCode::ACCEPTED,
    };

    Ok((
        status,
        Json(WaitResponse {
            job_id: job_id.to_string(),
            state: final_state,
        }),
    ))
}

fn require_job_id(query: &StatusQuery) -> Result<&str, ApiError> {
    query
        .job_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing jobId"))
}
