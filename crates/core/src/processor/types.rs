//! Inputs and outputs of the media processor.

use std::fmt;

/// A file received from the client.
#[derive(Debug, Clone)]
pub struct UploadedVideo {
    /// Filename as sent by the client, untrusted.
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl UploadedVideo {
    pub fn new(filename: Option<String>, content_type: Option<String>, data: Vec<u8>) -> Self {
        Self {
            filename,
            content_type,
            data,
        }
    }

    /// Extension to store the upload under, so the tool can sniff the container.
    pub fn extension(&self) -> String {
        self.filename
            .as_deref()
            .and_then(|name| std::path::Path::new(name).extension())
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or_else(|| "mp4".to_string())
    }

    pub fn is_video_content_type(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| ct.trim().to_ascii_lowercase().starts_with("video/"))
            .unwrap_or(false)
    }
}

/// MP3 produced by `/convert`.
#[derive(Debug, Clone)]
pub struct ConvertedAudio {
    /// Suggested download name.
    pub filename: String,
    pub data: Vec<u8>,
}

impl ConvertedAudio {
    pub const MEDIA_TYPE: &'static str = "audio/mpeg";
}

/// ZIP produced by `/clip`.
#[derive(Debug, Clone)]
pub struct ClipArchive {
    /// Suggested download name.
    pub filename: String,
    /// Entry names in archive order.
    pub entries: Vec<String>,
    pub data: Vec<u8>,
}

impl ClipArchive {
    pub const MEDIA_TYPE: &'static str = "application/zip";
}

/// Where a request is in its lifecycle. Used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPhase {
    Received,
    Validating,
    Processing,
    Responding,
    Cleaned,
}

impl fmt::Display for RequestPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Received => "received",
            Self::Validating => "validating",
            Self::Processing => "processing",
            Self::Responding => "responding",
            Self::Cleaned => "cleaned",
        };
        f.write_str(name)
    }
}
