//! Generation provider client.
//!
//! The provider is slow, asynchronous, and untrusted: `submit` returns an
//! opaque request ID immediately, and `poll` reports one of three
//! outcomes. The orchestrator never blocks waiting on it; each pipeline
//! tick performs at most one poll per project.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Errors from the generation provider client.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Provider transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Provider rejected the request: {0}")]
    Rejected(String),

    #[error("Provider returned an unexpected payload: {0}")]
    Protocol(String),
}

/// A scene submission: prompt, optional continuity frame, model tier.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitScene<'a> {
    pub prompt: &'a str,
    /// Continuity anchor; `None` means text-to-video.
    pub reference_frame_url: Option<&'a str>,
    pub model: &'a str,
}

/// Outcome of polling a generation request.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationPoll {
    /// Still in progress; check again on a later tick.
    Pending,
    Completed { video_url: String },
    Failed { reason: String },
}

/// Asynchronous video generation capability.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Dispatch a scene for generation, returning the provider's request ID.
    async fn submit(&self, scene: SubmitScene<'_>) -> Result<String, ProviderError>;

    /// Check the status of a previously submitted request.
    async fn poll(&self, request_id: &str) -> Result<GenerationPoll, ProviderError>;
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    request_id: String,
}

#[derive(Debug, Deserialize)]
struct PollResponse {
    status: String,
    video_url: Option<String>,
    error: Option<String>,
}

/// Production client targeting the generation provider's HTTP API.
pub struct HttpGenerationProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpGenerationProvider {
    /// Create a client for the given provider endpoint.
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
        }
    }
}

#[async_trait]
impl GenerationProvider for HttpGenerationProvider {
    async fn submit(&self, scene: SubmitScene<'_>) -> Result<String, ProviderError> {
        let url = format!("{}/v1/generations", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&scene)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Rejected(format!("{status}: {body}")));
        }

        let parsed: SubmitResponse = response.json().await?;
        tracing::debug!(request_id = %parsed.request_id, "Generation request submitted");
        Ok(parsed.request_id)
    }

    async fn poll(&self, request_id: &str) -> Result<GenerationPoll, ProviderError> {
        let url = format!("{}/v1/generations/{request_id}", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await?
            .error_for_status()?;

        let parsed: PollResponse = response.json().await?;
        match parsed.status.as_str() {
            "pending" | "processing" => Ok(GenerationPoll::Pending),
            "completed" => {
                let video_url = parsed.video_url.ok_or_else(|| {
                    ProviderError::Protocol("completed response missing video_url".into())
                })?;
                Ok(GenerationPoll::Completed { video_url })
            }
            "failed" => Ok(GenerationPoll::Failed {
                reason: parsed.error.unwrap_or_else(|| "unknown provider error".into()),
            }),
            other => Err(ProviderError::Protocol(format!(
                "unknown generation status: {other}"
            ))),
        }
    }
}
