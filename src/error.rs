//! Error types for Skriv.

use thiserror::Error;

/// Library-level error type for Skriv operations.
#[derive(Error, Debug)]
pub enum SkrivError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported input: {0}")]
    Validation(String),

    #[error("Could not decode audio: {0}")]
    Decode(String),

    #[error("Audio segmentation failed: {0}")]
    Segment(String),

    #[error("Transcription service error{}: {detail}", .chunk.map(|i| format!(" in chunk {i}")).unwrap_or_default())]
    Service {
        /// Index of the failing chunk, or None for a whole-file call.
        chunk: Option<usize>,
        detail: String,
    },

    #[error("Document export failed: {0}")]
    Export(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("External tool failed: {0}")]
    ToolFailed(String),
}

/// Result type alias for Skriv operations.
pub type Result<T> = std::result::Result<T, SkrivError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_display_includes_chunk_index() {
        let err = SkrivError::Service {
            chunk: Some(3),
            detail: "bad credential".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Transcription service error in chunk 3: bad credential"
        );
    }

    #[test]
    fn test_service_error_display_whole_file() {
        let err = SkrivError::Service {
            chunk: None,
            detail: "unreachable".to_string(),
        };
        assert_eq!(err.to_string(), "Transcription service error: unreachable");
    }
}
