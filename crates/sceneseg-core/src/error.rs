//! Error types for scene segmentation operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for scene segmentation operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while building embeddings, segmenting, or
/// scoring frames.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFprobe not found in PATH")]
    FfprobeNotFound,

    #[error("FFmpeg command failed: {message}")]
    FfmpegFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("FFprobe command failed: {message}")]
    FfprobeFailed {
        message: String,
        stderr: Option<String>,
    },

    #[error("Frame source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Embedding provider failed")]
    Provider(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Embedding dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Embedding provider returned {got} vectors for a batch of {expected} frames")]
    BatchLengthMismatch { expected: usize, got: usize },

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Invalid video file: {0}")]
    InvalidVideo(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl CoreError {
    /// Create a source-unavailable error.
    pub fn source_unavailable(message: impl Into<String>) -> Self {
        Self::SourceUnavailable(message.into())
    }

    /// Wrap an embedding provider error without altering it.
    pub fn provider(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Provider(Box::new(err))
    }

    /// Create an FFmpeg failure error.
    pub fn ffmpeg_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::FfmpegFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Create an FFprobe failure error.
    pub fn ffprobe_failed(message: impl Into<String>, stderr: Option<String>) -> Self {
        Self::FfprobeFailed {
            message: message.into(),
            stderr,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_preserves_source() {
        let inner = std::io::Error::new(std::io::ErrorKind::Other, "model crashed");
        let err = CoreError::provider(inner);
        let source = std::error::Error::source(&err).expect("source preserved");
        assert!(source.to_string().contains("model crashed"));
    }

    #[test]
    fn test_error_messages() {
        let err = CoreError::source_unavailable("cannot decode first frame");
        assert!(err.to_string().contains("cannot decode first frame"));

        let err = CoreError::DimensionMismatch {
            expected: 512,
            got: 640,
        };
        assert!(err.to_string().contains("512"));
        assert!(err.to_string().contains("640"));
    }
}
