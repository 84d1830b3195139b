use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobStatus {
    Completed,
    Failed,
}

/// Payload for the external job-status collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StatusUpdate {
    pub fn progress(pct: u8, message: impl Into<String>) -> Self {
        Self {
            status: None,
            progress: Some(pct.min(100)),
            message: Some(message.into()),
        }
    }

    pub fn completed(message: impl Into<String>) -> Self {
        Self {
            status: Some(JobStatus::Completed),
            progress: Some(100),
            message: Some(message.into()),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: Some(JobStatus::Failed),
            progress: None,
            message: Some(message.into()),
        }
    }
}

/// Receives coarse milestones. Implementations swallow their own failures:
/// reporting must never change the outcome of a run.
#[async_trait]
pub trait ProgressReporter: Send + Sync {
    async fn report(&self, update: StatusUpdate);
}

/// Used when no `--job-id` is given.
pub struct NoopReporter;

#[async_trait]
impl ProgressReporter for NoopReporter {
    async fn report(&self, update: StatusUpdate) {
        debug!(progress = ?update.progress, message = ?update.message, "progress");
    }
}

/// POSTs updates to `{base}/jobs/{job_id}`.
pub struct HttpStatusReporter {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpStatusReporter {
    pub fn new(base_url: &str, job_id: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_default();
        Self {
            client,
            endpoint: Self::endpoint(base_url, job_id),
        }
    }

    pub fn endpoint(base_url: &str, job_id: &str) -> String {
        format!(
            "{}/jobs/{}",
            base_url.trim_end_matches('/'),
            urlencoding::encode(job_id)
        )
    }
}

#[async_trait]
impl ProgressReporter for HttpStatusReporter {
    async fn report(&self, update: StatusUpdate) {
        match self.client.post(&self.endpoint).json(&update).send().await {
            Ok(resp) if resp.status().is_success() => {
                debug!(progress = ?update.progress, "job status updated");
            }
            Ok(resp) => {
                warn!(status = resp.status().as_u16(), "job status update rejected");
            }
            Err(e) => {
                warn!(error = %e, "failed to update job status");
            }
        }
    }
}
