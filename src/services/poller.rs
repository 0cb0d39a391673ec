//! Bounded status poller for dub jobs.
//!
//! A [`DubPoller`] owns one [`Job`] and walks it through
//! `Waiting -> Done | Failed | TimedOut`. Every tick first sleeps on the
//! injected [`Clock`] and then asks the [`StatusSource`] for one snapshot.
//! Dropping the poller (or the future running it) abandons the job.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::config::AppConfig;
use crate::models::job::{DubOutput, DubStatus, Job, StatusSnapshot};
use crate::services::dub::DubError;

/// Suspends the poller between ticks.
#[async_trait]
pub trait Clock: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Wall-clock sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Produces one status snapshot per call.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn snapshot(&self, job_id: &str) -> Result<StatusSnapshot, DubError>;
}

#[async_trait]
impl<T: StatusSource + ?Sized> StatusSource for Arc<T> {
    async fn snapshot(&self, job_id: &str) -> Result<StatusSnapshot, DubError> {
        (**self).snapshot(job_id).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            max_attempts: 60,
        }
    }
}

impl PollPolicy {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            interval: config.dub_poll_interval(),
            max_attempts: config.dub_max_poll_attempts.max(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PollState {
    Waiting {
        attempts: u32,
    },
    Done {
        outputs: Vec<DubOutput>,
    },
    Failed {
        locale: String,
    },
    TimedOut {
        attempts: u32,
        last_error: Option<String>,
    },
}

impl PollState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PollState::Waiting { .. })
    }
}

/// What one snapshot says about the requested locale.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Completed(Vec<DubOutput>),
    Failed,
    Pending,
}

/// Classify `snapshot` for `locale`.
///
/// Every completed entry for the locale is surfaced, duplicates included.
/// The locale only counts as failed when all of its entries are `FAILED`.
pub fn evaluate(snapshot: &StatusSnapshot, locale: &str) -> Verdict {
    let mut matching = 0usize;
    let mut failed = 0usize;
    let mut outputs = Vec::new();

    for entry in snapshot.for_locale(locale) {
        matching += 1;
        match entry.status {
            DubStatus::Completed => match entry.completed_url() {
                Some(url) => outputs.push(DubOutput {
                    locale: entry.locale.clone(),
                    url: url.to_string(),
                }),
                None => tracing::warn!(locale = %locale, "Completed dub entry has no download URL"),
            },
            DubStatus::Failed => failed += 1,
            _ => {}
        }
    }

    if !outputs.is_empty() {
        Verdict::Completed(outputs)
    } else if matching > 0 && failed == matching {
        Verdict::Failed
    } else {
        Verdict::Pending
    }
}

pub struct DubPoller<S, C> {
    job: Job,
    source: S,
    clock: C,
    policy: PollPolicy,
    state: PollState,
    last_error: Option<String>,
}

impl<S: StatusSource, C: Clock> DubPoller<S, C> {
    pub fn new(job: Job, source: S, clock: C, policy: PollPolicy) -> Self {
        Self {
            job,
            source,
            clock,
            policy,
            state: PollState::Waiting { attempts: 0 },
            last_error: None,
        }
    }

    pub fn job(&self) -> &Job {
        &self.job
    }

    pub fn state(&self) -> &PollState {
        &self.state
    }

    /// Sleep one interval, poll once, and advance the state.
    /// Does nothing once the poller is terminal.
    pub async fn tick(&mut self) -> &PollState {
        let attempts = match self.state {
            PollState::Waiting { attempts } => attempts,
            _ => return &self.state,
        };

        self.clock.sleep(self.policy.interval).await;
        let attempts = attempts + 1;

        let verdict = match self.source.snapshot(self.job.job_id()).await {
            Ok(snapshot) => evaluate(&snapshot, self.job.target_locale()),
            Err(e) => {
                tracing::warn!(
                    job_id = %self.job.job_id(),
                    attempt = attempts,
                    error = %e,
                    "Dub status poll failed, retrying on next tick"
                );
                self.last_error = Some(e.to_string());
                metrics::counter!("dub_poll_ticks_total", "outcome" => "error").increment(1);
                Verdict::Pending
            }
        };

        self.state = match verdict {
            Verdict::Completed(outputs) => {
                metrics::counter!("dub_poll_ticks_total", "outcome" => "completed").increment(1);
                tracing::info!(
                    job_id = %self.job.job_id(),
                    attempts,
                    outputs = outputs.len(),
                    "Dub job completed"
                );
                PollState::Done { outputs }
            }
            Verdict::Failed => {
                metrics::counter!("dub_poll_ticks_total", "outcome" => "failed").increment(1);
                tracing::warn!(
                    job_id = %self.job.job_id(),
                    locale = %self.job.target_locale(),
                    "Dub job failed for requested locale"
                );
                PollState::Failed {
                    locale: self.job.target_locale().to_string(),
                }
            }
            Verdict::Pending if attempts >= self.policy.max_attempts => {
                tracing::warn!(job_id = %self.job.job_id(), attempts, "Dub job timed out");
                PollState::TimedOut {
                    attempts,
                    last_error: self.last_error.take(),
                }
            }
            Verdict::Pending => {
                metrics::counter!("dub_poll_ticks_total", "outcome" => "pending").increment(1);
                tracing::debug!(job_id = %self.job.job_id(), attempts, "Dub job still pending");
                PollState::Waiting { attempts }
            }
        };

        &self.state
    }

    /// Tick until a terminal state is reached.
    pub async fn run(mut self) -> PollState {
        while !self.state.is_terminal() {
            self.tick().await;
        }
        self.state
    }
}

/// Tracks which job ids currently have a poller so no job is polled twice at once.
#[derive(Debug, Default)]
pub struct PollRegistry {
    active: Mutex<HashSet<String>>,
}

impl PollRegistry {
    /// Claim `job_id`, or `None` when another poller already holds it.
    pub fn acquire(self: &Arc<Self>, job_id: &str) -> Option<PollLease> {
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        if !active.insert(job_id.to_string()) {
            return None;
        }
        Some(PollLease {
            registry: Arc::clone(self),
            job_id: job_id.to_string(),
        })
    }

    pub fn active_count(&self) -> usize {
        self.active.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_active(&self, job_id: &str) -> bool {
        self.active
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(job_id)
    }
}

/// Releases the job id when dropped, including when the poll is abandoned.
#[derive(Debug)]
pub struct PollLease {
    registry: Arc<PollRegistry>,
    job_id: String,
}

impl Drop for PollLease {
    fn drop(&mut self) {
        self.registry
            .active
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.job_id);
    }
}
