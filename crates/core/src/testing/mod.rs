//! Testing utilities and mock implementations.
//!
//! [`MockConverter`] stands in for the external media tool so the processor
//! and the HTTP layer can be exercised without ffmpeg installed.
//!
//! # Example
//!
//! ```rust,ignore
//! use mediacut_core::testing::MockConverter;
//!
//! let converter = MockConverter::with_duration(100.0);
//! converter.fail_clip_number(2, "Error while decoding stream").await;
//!
//! // Hand it to a MediaProcessor...
//! ```

mod mock_converter;

pub use mock_converter::{MockCall, MockConverter};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::Path;

    use crate::converter::MediaInfo;

    /// Probe result for a short H.264/AAC video.
    pub fn video_info(path: &Path, duration_secs: f64) -> MediaInfo {
        MediaInfo {
            path: path.to_path_buf(),
            size_bytes: std::fs::metadata(path).map(|m| m.len()).unwrap_or(0),
            duration_secs,
            format: "mov,mp4,m4a,3gp,3g2,mj2".to_string(),
            audio_codec: Some("aac".to_string()),
            video_codec: Some("h264".to_string()),
            video_width: Some(1280),
            video_height: Some(720),
        }
    }
}
