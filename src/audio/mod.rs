//! Audio assets and segmentation.
//!
//! An uploaded file becomes an [`AudioAsset`]; large assets are cut into
//! fixed-duration [`Chunk`]s by a [`Segmenter`] implementation.

mod segmenter;

pub use segmenter::{plan_windows, FfmpegSegmenter};

use crate::error::{Result, SkrivError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Supported audio file extensions.
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav"];

/// An uploaded audio file plus its derived attributes.
///
/// Created once per request and read-only afterwards.
#[derive(Debug, Clone)]
pub struct AudioAsset {
    /// Path to the audio file on disk.
    pub path: PathBuf,
    /// Original file name.
    pub file_name: String,
    /// Lowercase extension (without the dot).
    pub extension: String,
    /// File size in bytes.
    pub size_bytes: u64,
}

impl AudioAsset {
    /// Build an asset from a local file, validating its extension against
    /// the allow-list.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| SkrivError::Validation(format!("Invalid file path: {}", path.display())))?
            .to_string();

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .unwrap_or_default();

        if !AUDIO_EXTENSIONS.contains(&extension.as_str()) {
            return Err(SkrivError::Validation(format!(
                "Unsupported audio format '{}'. Please use MP3 or WAV.",
                file_name
            )));
        }

        let size_bytes = std::fs::metadata(path)?.len();

        Ok(Self {
            path: path.to_path_buf(),
            file_name,
            extension,
            size_bytes,
        })
    }

    /// Check if a file name carries a supported extension.
    pub fn is_supported(name: &str) -> bool {
        Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| AUDIO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false)
    }
}

/// A time-bounded slice of an audio asset, materialized as an encoded file.
///
/// Windows are contiguous, non-overlapping, and cover the source duration
/// exactly; the last window holds the remainder.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// Zero-based position within the source asset.
    pub index: usize,
    /// Window start in milliseconds (inclusive).
    pub start_ms: u64,
    /// Window end in milliseconds (exclusive).
    pub end_ms: u64,
    /// Path to the encoded chunk file.
    pub path: PathBuf,
}

/// Trait for audio segmentation backends.
#[async_trait]
pub trait Segmenter: Send + Sync {
    /// Split `source` into consecutive windows of `window_ms`, writing chunk
    /// files into `out_dir`. Returns chunks in ascending time order; a source
    /// no longer than one window yields a single chunk covering the whole
    /// asset.
    async fn segment(&self, source: &Path, out_dir: &Path, window_ms: u64) -> Result<Vec<Chunk>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_supported() {
        assert!(AudioAsset::is_supported("note.mp3"));
        assert!(AudioAsset::is_supported("note.WAV"));
        assert!(AudioAsset::is_supported("/path/to/note.Mp3"));
        assert!(!AudioAsset::is_supported("clip.flac"));
        assert!(!AudioAsset::is_supported("video.mp4"));
        assert!(!AudioAsset::is_supported("noextension"));
    }

    #[test]
    fn test_from_path_rejects_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("document.pdf");
        std::fs::write(&path, b"not audio").unwrap();

        let err = AudioAsset::from_path(&path).unwrap_err();
        assert!(matches!(err, SkrivError::Validation(_)));
    }

    #[test]
    fn test_from_path_captures_attributes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Note.MP3");
        std::fs::write(&path, vec![0u8; 128]).unwrap();

        let asset = AudioAsset::from_path(&path).unwrap();
        assert_eq!(asset.file_name, "Note.MP3");
        assert_eq!(asset.extension, "mp3");
        assert_eq!(asset.size_bytes, 128);
    }
}
