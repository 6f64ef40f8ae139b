//! Trait definitions for the converter module.

use async_trait::async_trait;
use std::path::Path;

use super::error::ConverterError;
use super::types::{ConversionJob, ConversionResult, ConversionTask, MediaInfo};

/// A converter that delegates media work to an external tool.
#[async_trait]
pub trait Converter: Send + Sync {
    /// Returns the name of this converter implementation.
    fn name(&self) -> &str;

    /// Probes a media file to get its information.
    async fn probe(&self, path: &Path) -> Result<MediaInfo, ConverterError>;

    /// Runs one conversion job.
    ///
    /// Writes exactly one file at `job.output_path` on success. On failure no
    /// partial output is left behind.
    async fn convert(&self, job: ConversionJob) -> Result<ConversionResult, ConverterError>;

    /// Validates that the converter is properly configured and ready.
    async fn validate(&self) -> Result<(), ConverterError>;

    /// Extracts the audio track of `input` into an MP3 at `output`.
    async fn extract_audio(
        &self,
        input: &Path,
        output: &Path,
    ) -> Result<ConversionResult, ConverterError> {
        self.convert(job_for(input, output, ConversionTask::Audio))
            .await
    }

    /// Cuts `[start_secs, end_secs)` out of `input` into `output`.
    async fn extract_clip(
        &self,
        input: &Path,
        start_secs: f64,
        end_secs: f64,
        output: &Path,
    ) -> Result<ConversionResult, ConverterError> {
        let task = ConversionTask::Clip {
            start_secs,
            end_secs,
        };
        self.convert(job_for(input, output, task)).await
    }
}

/// Job named after the output file.
fn job_for(input: &Path, output: &Path, task: ConversionTask) -> ConversionJob {
    let job_id = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| task.label().to_string());
    ConversionJob {
        job_id,
        input_path: input.to_path_buf(),
        output_path: output.to_path_buf(),
        task,
    }
}
