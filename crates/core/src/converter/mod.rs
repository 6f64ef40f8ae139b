//! Converter module for running the external media tool.
//!
//! This module provides the `Converter` trait and an FFmpeg-backed
//! implementation that can:
//!
//! - Probe a media file for its duration and streams (ffprobe)
//! - Extract the audio track of a video into an MP3 file
//! - Cut a time-bounded clip out of a video into an MP4 file
//!
//! # Example
//!
//! ```ignore
//! use mediacut_core::converter::{Converter, ConversionJob, ConversionTask, FfmpegConverter};
//!
//! let converter = FfmpegConverter::with_defaults();
//! converter.validate().await?;
//!
//! let info = converter.probe(Path::new("/scratch/input.mp4")).await?;
//! println!("Duration: {} seconds", info.duration_secs);
//!
//! let job = ConversionJob {
//!     job_id: "clip-1".to_string(),
//!     input_path: PathBuf::from("/scratch/input.mp4"),
//!     output_path: PathBuf::from("/scratch/clip_1.mp4"),
//!     task: ConversionTask::Clip { start_secs: 10.0, end_secs: 20.0 },
//! };
//! let result = converter.convert(job).await?;
//! println!("Wrote {} bytes in {} ms", result.output_size_bytes, result.duration_ms);
//! ```

mod config;
mod error;
mod ffmpeg;
mod traits;
mod types;

pub use config::ConverterConfig;
pub use error::ConverterError;
pub use ffmpeg::FfmpegConverter;
pub use traits::Converter;
pub use types::{ConversionJob, ConversionResult, ConversionTask, MediaInfo};
