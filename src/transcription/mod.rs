//! Transcription module for Skriv.
//!
//! Wraps the AssemblyAI speech-to-text API behind the [`Transcriber`] trait.
//! Service-level failures (bad credential, service error status) come back as
//! [`TranscriptionOutcome::Failed`] values; only local faults such as an
//! unreadable file surface as errors.

mod assemblyai;

pub use assemblyai::AssemblyAiTranscriber;

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Terminal result of one transcription round trip.
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptionOutcome {
    /// The service finished and returned transcript text.
    Completed { text: String },
    /// The service reported a terminal error for this audio.
    Failed { detail: String },
}

/// Trait for transcription services.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe one audio file (a whole asset or a single chunk), blocking
    /// until the service reports a terminal status. No retries.
    async fn transcribe(&self, audio_path: &Path) -> Result<TranscriptionOutcome>;
}
