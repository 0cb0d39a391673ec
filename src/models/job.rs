use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Per-locale status reported by the dubbing service.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DubStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

/// A dubbing job accepted by the remote service.
///
/// Only [`crate::services::dub::DubClient::submit`] and [`Job::new`] create
/// one, and both require a non-empty job id, so a poller can never be
/// started for a job that does not exist yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    job_id: String,
    target_locale: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
#[error("job id must not be empty")]
pub struct EmptyJobId;

impl Job {
    pub fn new(job_id: impl Into<String>, target_locale: impl Into<String>) -> Result<Self, EmptyJobId> {
        let job_id = job_id.into();
        if job_id.trim().is_empty() {
            return Err(EmptyJobId);
        }
        Ok(Self {
            job_id,
            target_locale: target_locale.into(),
            created_at: Utc::now(),
        })
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn target_locale(&self) -> &str {
        &self.target_locale
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// One entry of `download_details` in a status response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocaleResult {
    #[serde(default)]
    pub locale: String,
    pub status: DubStatus,
    #[serde(default)]
    pub download_url: Option<String>,
}

impl LocaleResult {
    /// Download URL of a completed entry, if it actually carries one.
    pub fn completed_url(&self) -> Option<&str> {
        match (self.status, self.download_url.as_deref()) {
            (DubStatus::Completed, Some(url)) if !url.trim().is_empty() => Some(url),
            _ => None,
        }
    }
}

/// One status poll, parsed from the raw payload. Not persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StatusSnapshot {
    #[serde(default)]
    pub download_details: Vec<LocaleResult>,
}

impl StatusSnapshot {
    pub fn for_locale<'a>(&'a self, locale: &'a str) -> impl Iterator<Item = &'a LocaleResult> + 'a {
        self.download_details.iter().filter(move |d| d.locale == locale)
    }
}

/// A finished dub for one locale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DubOutput {
    pub locale: String,
    pub url: String,
}
