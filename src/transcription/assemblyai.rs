//! AssemblyAI transcription implementation.
//!
//! One call is three HTTP steps: upload the bytes, create a transcript job
//! with a fixed speech model, then poll the job until it reaches a terminal
//! status (`completed` or `error`).

use super::{Transcriber, TranscriptionOutcome};
use crate::config::TranscriptionSettings;
use crate::error::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, instrument};

/// AssemblyAI-based transcriber.
///
/// Holds the caller-supplied credential for the lifetime of one request; it
/// is never written to configuration or process-wide state.
pub struct AssemblyAiTranscriber {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    speech_model: String,
    poll_interval: Duration,
}

#[derive(Deserialize)]
struct UploadResponse {
    upload_url: String,
}

#[derive(Deserialize)]
struct TranscriptResponse {
    id: String,
    status: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl AssemblyAiTranscriber {
    /// Create a transcriber for one credential, with the service parameters
    /// from settings.
    pub fn new(api_key: &str, settings: &TranscriptionSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.to_string(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            speech_model: settings.speech_model.clone(),
            poll_interval: Duration::from_millis(settings.poll_interval_ms),
        }
    }

    /// Upload raw audio bytes, returning the service-side URL.
    async fn upload(&self, bytes: Vec<u8>) -> std::result::Result<String, reqwest::Error> {
        let response: UploadResponse = self
            .client
            .post(format!("{}/upload", self.base_url))
            .header("authorization", &self.api_key)
            .header("content-type", "application/octet-stream")
            .body(bytes)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response.upload_url)
    }

    /// Create a transcript job for an uploaded audio URL.
    async fn create_job(&self, audio_url: &str) -> std::result::Result<TranscriptResponse, reqwest::Error> {
        self.client
            .post(format!("{}/transcript", self.base_url))
            .header("authorization", &self.api_key)
            .json(&serde_json::json!({
                "audio_url": audio_url,
                "speech_model": self.speech_model,
            }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    /// Fetch the current state of a transcript job.
    async fn poll_job(&self, id: &str) -> std::result::Result<TranscriptResponse, reqwest::Error> {
        self.client
            .get(format!("{}/transcript/{}", self.base_url, id))
            .header("authorization", &self.api_key)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    /// Run one full round trip, mapping every service-side failure into a
    /// `Failed` outcome.
    async fn run(&self, bytes: Vec<u8>) -> TranscriptionOutcome {
        let upload_url = match self.upload(bytes).await {
            Ok(url) => url,
            Err(e) => {
                return TranscriptionOutcome::Failed {
                    detail: format!("Upload failed: {e}"),
                }
            }
        };

        let mut job = match self.create_job(&upload_url).await {
            Ok(job) => job,
            Err(e) => {
                return TranscriptionOutcome::Failed {
                    detail: format!("Could not create transcript: {e}"),
                }
            }
        };

        // Block until the service reports a terminal status.
        loop {
            match job.status.as_str() {
                "completed" => {
                    return TranscriptionOutcome::Completed {
                        text: job.text.unwrap_or_default().trim().to_string(),
                    }
                }
                "error" => {
                    return TranscriptionOutcome::Failed {
                        detail: job
                            .error
                            .unwrap_or_else(|| "Service returned an unspecified error".to_string()),
                    }
                }
                status => {
                    debug!("Transcript {} is {}, polling again", job.id, status);
                    tokio::time::sleep(self.poll_interval).await;
                    job = match self.poll_job(&job.id).await {
                        Ok(job) => job,
                        Err(e) => {
                            return TranscriptionOutcome::Failed {
                                detail: format!("Polling failed: {e}"),
                            }
                        }
                    };
                }
            }
        }
    }
}

#[async_trait]
impl Transcriber for AssemblyAiTranscriber {
    #[instrument(skip(self), fields(audio_path = %audio_path.display()))]
    async fn transcribe(&self, audio_path: &Path) -> Result<TranscriptionOutcome> {
        // Unreadable local input is a local fault, not a service status.
        let bytes = tokio::fs::read(audio_path).await?;

        debug!("Submitting {} bytes to AssemblyAI", bytes.len());
        Ok(self.run(bytes).await)
    }
}
