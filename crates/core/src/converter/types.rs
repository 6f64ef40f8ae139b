//! Types for the converter module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What a conversion job should produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConversionTask {
    /// Extract the audio track into an MP3 file.
    Audio,
    /// Cut `[start_secs, end_secs)` out of the input into an MP4 file.
    /// Boundary rounding is whatever the tool does for a start/duration trim.
    Clip { start_secs: f64, end_secs: f64 },
}

impl ConversionTask {
    /// Short label used in logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Clip { .. } => "clip",
        }
    }
}

/// A single invocation of the media tool.
#[derive(Debug, Clone)]
pub struct ConversionJob {
    /// Identifier used for log correlation.
    pub job_id: String,
    /// Source media file.
    pub input_path: PathBuf,
    /// File to create. Overwritten if present.
    pub output_path: PathBuf,
    pub task: ConversionTask,
}

/// Outcome of a successful conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionResult {
    pub job_id: String,
    pub output_path: PathBuf,
    pub output_size_bytes: u64,
    /// Wall-clock time spent in the tool, in milliseconds.
    pub duration_ms: u64,
}

/// Information about a media file, as reported by ffprobe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaInfo {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub duration_secs: f64,
    /// Container format (first entry of ffprobe's `format_name`).
    pub format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_codec: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_codec: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_height: Option<u32>,
}

impl MediaInfo {
    pub fn has_audio(&self) -> bool {
        self.audio_codec.is_some()
    }

    pub fn has_video(&self) -> bool {
        self.video_codec.is_some()
    }
}
