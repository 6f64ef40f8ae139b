//! Error types for the converter module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while running the external media tool.
#[derive(Debug, Error)]
pub enum ConverterError {
    /// FFmpeg binary not found.
    #[error("FFmpeg not found at path: {path}")]
    FfmpegNotFound { path: PathBuf },

    /// FFprobe binary not found.
    #[error("FFprobe not found at path: {path}")]
    FfprobeNotFound { path: PathBuf },

    /// Input file not found.
    #[error("Input file not found: {path}")]
    InputNotFound { path: PathBuf },

    /// The tool ran but did not produce a usable output.
    #[error("{reason}: {}", diagnostic_text(.stderr))]
    ConversionFailed {
        reason: String,
        stderr: Option<String>,
    },

    /// The tool did not finish in time and was killed.
    #[error("Media tool timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// Failed to probe media file.
    #[error("Failed to probe media file: {reason}")]
    ProbeFailed { reason: String },

    /// Invalid job parameters.
    #[error("Invalid job: {reason}")]
    InvalidJob { reason: String },

    /// I/O error while spawning the tool or inspecting its output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse FFprobe output.
    #[error("Failed to parse media info: {reason}")]
    ParseError { reason: String },
}

fn diagnostic_text(stderr: &Option<String>) -> &str {
    stderr
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("no diagnostic output")
}

impl ConverterError {
    /// Creates a new conversion failed error with stderr output.
    pub fn conversion_failed(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::ConversionFailed {
            reason: reason.into(),
            stderr,
        }
    }

    /// Creates a new probe failed error.
    pub fn probe_failed(reason: impl Into<String>) -> Self {
        Self::ProbeFailed {
            reason: reason.into(),
        }
    }

    /// Creates a new invalid job error.
    pub fn invalid_job(reason: impl Into<String>) -> Self {
        Self::InvalidJob {
            reason: reason.into(),
        }
    }

    /// Diagnostic text emitted by the tool, if any was captured.
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            Self::ConversionFailed { stderr, .. } => stderr.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_failed_includes_stderr() {
        let err = ConverterError::conversion_failed(
            "FFmpeg exited with code 1",
            Some("input.mp4: Invalid data found when processing input\n".to_string()),
        );
        assert_eq!(
            err.to_string(),
            "FFmpeg exited with code 1: input.mp4: Invalid data found when processing input"
        );
        assert!(err.diagnostic().unwrap().contains("Invalid data"));
    }

    #[test]
    fn test_conversion_failed_without_stderr() {
        let err = ConverterError::conversion_failed("Output file not created", None);
        assert_eq!(
            err.to_string(),
            "Output file not created: no diagnostic output"
        );
    }
}
