//! HTTP client for the cloud print queue.
//!
//! Wraps `POST /print-jobs/claim`, `POST /print-jobs/{id}/complete` and the
//! unauthenticated image download using [`reqwest`]. The poll loop talks to
//! the queue through [`PrintQueueApi`] so tests can substitute a fake.

use std::time::Duration;

use async_trait::async_trait;
use photobooth_core::print_job::{
    ClaimedPrintJob, CompletePrintJob, AGENT_ID_HEADER, AGENT_KEY_HEADER,
};
use photobooth_core::types::DbId;
use serde::Deserialize;

use crate::error::AgentError;

/// Queue operations the poll loop depends on.
#[async_trait]
pub trait PrintQueueApi: Send + Sync {
    /// Claim the next eligible job. `None` means the queue is empty.
    async fn claim(&self) -> Result<Option<ClaimedPrintJob>, AgentError>;

    /// Report the terminal outcome of a claimed job.
    async fn complete(&self, job_id: DbId, body: &CompletePrintJob) -> Result<(), AgentError>;

    /// Fetch the source image bytes.
    async fn download_image(&self, url: &str) -> Result<Vec<u8>, AgentError>;
}

/// `{ "data": T }` envelope used by every queue response.
#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

/// HTTP client for one cloud API instance.
#[derive(Clone)]
pub struct QueueClient {
    client: reqwest::Client,
    base_url: String,
    agent_key: String,
    agent_id: String,
}

impl QueueClient {
    /// Create a client for the API at `base_url` (no trailing slash).
    ///
    /// Every request, image downloads included, is abandoned after
    /// `timeout` so a stalled connection cannot hold a claim past its lease.
    pub fn new(
        base_url: String,
        agent_key: String,
        agent_id: String,
        timeout: Duration,
    ) -> Result<Self, AgentError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url, agent_key, agent_id))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(
        client: reqwest::Client,
        base_url: String,
        agent_key: String,
        agent_id: String,
    ) -> Self {
        Self {
            client,
            base_url,
            agent_key,
            agent_id,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{path}", self.base_url)
    }

    fn agent_post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .post(self.url(path))
            .header(AGENT_KEY_HEADER, &self.agent_key)
            .header(AGENT_ID_HEADER, &self.agent_id)
    }

    /// Turn a non-2xx response into [`AgentError::ApiError`].
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, AgentError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(AgentError::ApiError {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl PrintQueueApi for QueueClient {
    async fn claim(&self) -> Result<Option<ClaimedPrintJob>, AgentError> {
        let response = self.agent_post("/print-jobs/claim").send().await?;
        let envelope: DataEnvelope<Option<ClaimedPrintJob>> =
            Self::ensure_success(response).await?.json().await?;
        Ok(envelope.data)
    }

    async fn complete(&self, job_id: DbId, body: &CompletePrintJob) -> Result<(), AgentError> {
        let response = self
            .agent_post(&format!("/print-jobs/{job_id}/complete"))
            .json(body)
            .send()
            .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn download_image(&self, url: &str) -> Result<Vec<u8>, AgentError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AgentError::Download(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(AgentError::Download(format!("{url} returned {status}")));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| AgentError::Download(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}
