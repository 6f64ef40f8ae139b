//! Request-level orchestration of uploads, the converter and packaging.
//!
//! A [`MediaProcessor`] takes one upload from the HTTP layer, persists it into
//! a fresh [`Workspace`](crate::workspace::Workspace), runs the converter and
//! returns the packaged bytes. The workspace is released before any result is
//! returned, on success and on every error path.

mod config;
mod error;
mod media;
mod types;

pub use config::ProcessorConfig;
pub use error::ProcessError;
pub use media::MediaProcessor;
pub use types::{ClipArchive, ConvertedAudio, RequestPhase, UploadedVideo};
