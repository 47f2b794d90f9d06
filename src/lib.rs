//! Skriv - Chunked Audio Transcription
//!
//! A CLI tool and web form for transcribing voice notes with AssemblyAI.
//!
//! The name "Skriv" comes from the Norwegian/Scandinavian word for "write."
//!
//! # Overview
//!
//! Skriv allows you to:
//! - Transcribe local MP3/WAV files through the AssemblyAI API
//! - Handle large files transparently by splitting them into 5-minute chunks
//! - Get a short word-budget summary alongside the full transcript
//! - Download the transcript as a Word (.docx) document
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `audio` - Audio assets and ffmpeg-based segmentation
//! - `transcription` - Speech-to-text via AssemblyAI
//! - `pipeline` - Chunked transcription orchestration
//! - `summary` - Transcript summarization
//! - `export` - DOCX export
//!
//! # Example
//!
//! ```rust,no_run
//! use skriv::audio::AudioAsset;
//! use skriv::config::Settings;
//! use skriv::pipeline::Pipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let pipeline = Pipeline::new("aai-api-key", &settings);
//!
//!     let asset = AudioAsset::from_path("voice-note.mp3")?;
//!     let outcome = pipeline.process(&asset).await?;
//!     println!("{}", outcome.transcript);
//!
//!     Ok(())
//! }
//! ```

pub mod audio;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod summary;
pub mod transcription;

pub use error::{Result, SkrivError};
