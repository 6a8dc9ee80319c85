//! Media storage client.
//!
//! Storage materializes a provider-hosted video into durable public
//! hosting, extracts the last frame for continuity, and assembles the
//! final movie from completed scene clips. Frame extraction is best
//! effort: its failure leaves `last_frame_url` empty and the next scene
//! degrades to text-to-video.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Errors from the media storage client.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Storage request failed: {0}")]
    Failed(String),
}

/// Result of materializing one generated video.
#[derive(Debug, Clone, Deserialize)]
pub struct MaterializedVideo {
    /// Durable, publicly servable video URL.
    pub public_video_url: String,
    /// Extracted last frame; `None` when extraction failed (non-fatal).
    pub last_frame_url: Option<String>,
    pub duration_seconds: Option<f64>,
}

/// Durable hosting and post-processing for generated videos.
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Copy a provider video into durable hosting and extract its last frame.
    async fn materialize(&self, video_url: &str) -> Result<MaterializedVideo, StorageError>;

    /// Assemble the final movie from scene clips, in scene order.
    async fn compose_final(
        &self,
        project_id: i64,
        scene_urls: &[String],
    ) -> Result<String, StorageError>;
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct MaterializeRequest<'a> {
    video_url: &'a str,
}

#[derive(Debug, Serialize)]
struct ComposeRequest<'a> {
    project_id: i64,
    scene_urls: &'a [String],
}

#[derive(Debug, Deserialize)]
struct ComposeResponse {
    final_video_url: String,
}

/// Production client targeting the storage service's HTTP API.
pub struct HttpMediaStorage {
    client: reqwest::Client,
    base_url: String,
}

impl HttpMediaStorage {
    /// Create a client for the given storage endpoint.
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }
}

#[async_trait]
impl MediaStorage for HttpMediaStorage {
    async fn materialize(&self, video_url: &str) -> Result<MaterializedVideo, StorageError> {
        let url = format!("{}/v1/materialize", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&MaterializeRequest { video_url })
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    async fn compose_final(
        &self,
        project_id: i64,
        scene_urls: &[String],
    ) -> Result<String, StorageError> {
        let url = format!("{}/v1/compose", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&ComposeRequest {
                project_id,
                scene_urls,
            })
            .send()
            .await?
            .error_for_status()?;
        let parsed: ComposeResponse = response.json().await?;
        Ok(parsed.final_video_url)
    }
}
