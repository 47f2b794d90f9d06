//! Chunked transcription pipeline for Skriv.
//!
//! Coordinates the path from an uploaded audio asset to its full transcript:
//! assets over the size threshold are segmented into fixed windows and
//! transcribed chunk by chunk, strictly in order; the rest go to the service
//! in one call. The first chunk failure halts dispatch and discards any
//! partial aggregate.

use crate::audio::{AudioAsset, FfmpegSegmenter, Segmenter};
use crate::config::Settings;
use crate::error::{Result, SkrivError};
use crate::transcription::{AssemblyAiTranscriber, Transcriber, TranscriptionOutcome};
use std::sync::Arc;
use tracing::{info, instrument};

/// Callback invoked with the completed fraction after each successful chunk.
pub type ProgressFn = Arc<dyn Fn(f64) + Send + Sync>;

/// The transcription pipeline for one request.
pub struct Pipeline {
    transcriber: Arc<dyn Transcriber>,
    segmenter: Arc<dyn Segmenter>,
    split_threshold_bytes: u64,
    chunk_window_ms: u64,
}

impl Pipeline {
    /// Create a pipeline from a caller-supplied credential and settings.
    pub fn new(api_key: &str, settings: &Settings) -> Self {
        Self {
            transcriber: Arc::new(AssemblyAiTranscriber::new(
                api_key,
                &settings.transcription,
            )),
            segmenter: Arc::new(FfmpegSegmenter::new()),
            split_threshold_bytes: settings.transcription.split_threshold_bytes,
            chunk_window_ms: settings.transcription.chunk_window_ms,
        }
    }

    /// Create a pipeline with custom components.
    pub fn with_components(
        transcriber: Arc<dyn Transcriber>,
        segmenter: Arc<dyn Segmenter>,
        split_threshold_bytes: u64,
        chunk_window_ms: u64,
    ) -> Self {
        Self {
            transcriber,
            segmenter,
            split_threshold_bytes,
            chunk_window_ms,
        }
    }

    /// Whether an asset takes the split path. An asset of exactly the
    /// threshold size is transcribed whole.
    pub fn needs_split(&self, asset: &AudioAsset) -> bool {
        asset.size_bytes > self.split_threshold_bytes
    }

    /// Transcribe an asset without progress reporting.
    pub async fn process(&self, asset: &AudioAsset) -> Result<PipelineOutcome> {
        self.process_with_progress(asset, None).await
    }

    /// Transcribe an asset, optionally reporting fractional progress after
    /// each successful chunk.
    #[instrument(skip(self, progress), fields(file = %asset.file_name, size = asset.size_bytes))]
    pub async fn process_with_progress(
        &self,
        asset: &AudioAsset,
        progress: Option<ProgressFn>,
    ) -> Result<PipelineOutcome> {
        if self.needs_split(asset) {
            self.process_split(asset, progress).await
        } else {
            self.process_direct(asset, progress).await
        }
    }

    /// Direct path: one service call on the whole asset.
    async fn process_direct(
        &self,
        asset: &AudioAsset,
        progress: Option<ProgressFn>,
    ) -> Result<PipelineOutcome> {
        info!("Transcribing whole file");

        match self.transcriber.transcribe(&asset.path).await? {
            TranscriptionOutcome::Completed { text } => {
                if let Some(p) = &progress {
                    p(1.0);
                }
                Ok(PipelineOutcome {
                    transcript: text,
                    chunk_count: 1,
                })
            }
            TranscriptionOutcome::Failed { detail } => Err(SkrivError::Service {
                chunk: None,
                detail,
            }),
        }
    }

    /// Split path: segment, then transcribe chunks sequentially in ascending
    /// index order. Chunk files live in a scoped temp directory and are
    /// removed when it drops, on success or failure.
    async fn process_split(
        &self,
        asset: &AudioAsset,
        progress: Option<ProgressFn>,
    ) -> Result<PipelineOutcome> {
        info!(
            "File exceeds {} byte threshold, splitting",
            self.split_threshold_bytes
        );

        let temp_dir = tempfile::tempdir()?;
        let chunks = self
            .segmenter
            .segment(&asset.path, temp_dir.path(), self.chunk_window_ms)
            .await?;

        let total = chunks.len();
        info!("Transcribing {} chunks", total);

        let mut aggregate = String::new();

        for chunk in &chunks {
            match self.transcriber.transcribe(&chunk.path).await? {
                TranscriptionOutcome::Completed { text } => {
                    aggregate.push_str(&text);
                    aggregate.push('\n');
                    if let Some(p) = &progress {
                        p((chunk.index + 1) as f64 / total as f64);
                    }
                }
                TranscriptionOutcome::Failed { detail } => {
                    // Remaining chunks are never dispatched; the partial
                    // aggregate does not leave this function.
                    return Err(SkrivError::Service {
                        chunk: Some(chunk.index),
                        detail,
                    });
                }
            }
        }

        Ok(PipelineOutcome {
            transcript: aggregate,
            chunk_count: total,
        })
    }
}

/// Result of a successful pipeline run.
#[derive(Debug)]
pub struct PipelineOutcome {
    /// Full transcript: chunk texts in ascending index order, each followed
    /// by a newline on the split path; the service text as-is on the direct
    /// path.
    pub transcript: String,
    /// Number of chunks transcribed (1 on the direct path).
    pub chunk_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::Chunk;
    use crate::audio::Segmenter;
    use async_trait::async_trait;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    /// Hands out scripted outcomes in call order and records each call.
    struct ScriptedTranscriber {
        outcomes: Mutex<Vec<TranscriptionOutcome>>,
        calls: Mutex<Vec<PathBuf>>,
    }

    impl ScriptedTranscriber {
        fn new(mut outcomes: Vec<TranscriptionOutcome>) -> Self {
            outcomes.reverse();
            Self {
                outcomes: Mutex::new(outcomes),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Transcriber for ScriptedTranscriber {
        async fn transcribe(&self, audio_path: &Path) -> Result<TranscriptionOutcome> {
            self.calls.lock().unwrap().push(audio_path.to_path_buf());
            Ok(self
                .outcomes
                .lock()
                .unwrap()
                .pop()
                .expect("more calls than scripted outcomes"))
        }
    }

    /// Produces fixed windows without touching ffmpeg.
    struct FixedSegmenter {
        duration_ms: u64,
    }

    #[async_trait]
    impl Segmenter for FixedSegmenter {
        async fn segment(
            &self,
            _source: &Path,
            out_dir: &Path,
            window_ms: u64,
        ) -> Result<Vec<Chunk>> {
            Ok(crate::audio::plan_windows(self.duration_ms, window_ms)
                .into_iter()
                .enumerate()
                .map(|(index, (start_ms, end_ms))| Chunk {
                    index,
                    start_ms,
                    end_ms,
                    path: out_dir.join(format!("chunk_{:04}.mp3", index)),
                })
                .collect())
        }
    }

    fn completed(text: &str) -> TranscriptionOutcome {
        TranscriptionOutcome::Completed {
            text: text.to_string(),
        }
    }

    fn asset_of_size(dir: &tempfile::TempDir, bytes: usize) -> AudioAsset {
        let path = dir.path().join("note.mp3");
        std::fs::write(&path, vec![0u8; bytes]).unwrap();
        AudioAsset::from_path(&path).unwrap()
    }

    fn pipeline(
        transcriber: Arc<ScriptedTranscriber>,
        duration_ms: u64,
        threshold: u64,
    ) -> Pipeline {
        Pipeline::with_components(
            transcriber,
            Arc::new(FixedSegmenter { duration_ms }),
            threshold,
            300_000,
        )
    }

    #[tokio::test]
    async fn test_direct_path_at_exact_threshold() {
        let dir = tempfile::tempdir().unwrap();
        let asset = asset_of_size(&dir, 1024);

        let transcriber = Arc::new(ScriptedTranscriber::new(vec![completed("hello")]));
        let pipeline = pipeline(transcriber.clone(), 720_000, 1024);

        assert!(!pipeline.needs_split(&asset));
        let outcome = pipeline.process(&asset).await.unwrap();

        assert_eq!(outcome.transcript, "hello");
        assert_eq!(outcome.chunk_count, 1);
        assert_eq!(transcriber.call_count(), 1);
    }

    #[tokio::test]
    async fn test_one_byte_over_threshold_takes_split_path() {
        let dir = tempfile::tempdir().unwrap();
        let asset = asset_of_size(&dir, 1025);

        let transcriber = Arc::new(ScriptedTranscriber::new(vec![
            completed("a"),
            completed("b"),
            completed("c"),
        ]));
        let pipeline = pipeline(transcriber.clone(), 720_000, 1024);

        assert!(pipeline.needs_split(&asset));
        let outcome = pipeline.process(&asset).await.unwrap();

        assert_eq!(outcome.chunk_count, 3);
        assert_eq!(transcriber.call_count(), 3);
    }

    #[tokio::test]
    async fn test_split_aggregate_is_ordered_and_newline_joined() {
        let dir = tempfile::tempdir().unwrap();
        let asset = asset_of_size(&dir, 2048);

        let transcriber = Arc::new(ScriptedTranscriber::new(vec![
            completed("a"),
            completed("b"),
            completed("c"),
        ]));
        // 12-minute audio with a 5-minute window: chunks of 5min, 5min, 2min
        let pipeline = pipeline(transcriber.clone(), 720_000, 1024);

        let outcome = pipeline.process(&asset).await.unwrap();
        assert_eq!(outcome.transcript, "a\nb\nc\n");

        let calls = transcriber.calls.lock().unwrap();
        let names: Vec<_> = calls
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["chunk_0000.mp3", "chunk_0001.mp3", "chunk_0002.mp3"]);
    }

    #[tokio::test]
    async fn test_first_failure_halts_dispatch() {
        let dir = tempfile::tempdir().unwrap();
        let asset = asset_of_size(&dir, 2048);

        let transcriber = Arc::new(ScriptedTranscriber::new(vec![
            completed("a"),
            TranscriptionOutcome::Failed {
                detail: "invalid audio".to_string(),
            },
            completed("never reached"),
        ]));
        let pipeline = pipeline(transcriber.clone(), 900_000, 1024);

        let err = pipeline.process(&asset).await.unwrap_err();
        match err {
            SkrivError::Service { chunk, detail } => {
                assert_eq!(chunk, Some(1));
                assert_eq!(detail, "invalid audio");
            }
            other => panic!("unexpected error: {other}"),
        }

        // Chunk 2 is never dispatched.
        assert_eq!(transcriber.call_count(), 2);
    }

    #[tokio::test]
    async fn test_progress_is_monotonic_and_reaches_one() {
        let dir = tempfile::tempdir().unwrap();
        let asset = asset_of_size(&dir, 2048);

        let transcriber = Arc::new(ScriptedTranscriber::new(vec![
            completed("a"),
            completed("b"),
            completed("c"),
            completed("d"),
        ]));
        let pipeline = pipeline(transcriber, 1_200_000, 1024);

        let seen: Arc<Mutex<Vec<f64>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let progress: ProgressFn = Arc::new(move |fraction| {
            sink.lock().unwrap().push(fraction);
        });

        pipeline
            .process_with_progress(&asset, Some(progress))
            .await
            .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 4);
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*seen.last().unwrap(), 1.0);
    }

    #[tokio::test]
    async fn test_direct_failure_has_no_chunk_index() {
        let dir = tempfile::tempdir().unwrap();
        let asset = asset_of_size(&dir, 100);

        let transcriber = Arc::new(ScriptedTranscriber::new(vec![
            TranscriptionOutcome::Failed {
                detail: "expired credential".to_string(),
            },
        ]));
        let pipeline = pipeline(transcriber, 60_000, 1024);

        let err = pipeline.process(&asset).await.unwrap_err();
        assert!(matches!(err, SkrivError::Service { chunk: None, .. }));
    }
}
