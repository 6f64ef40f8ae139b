//! The media processor.

use std::io;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::clip::{
    archive_filename, audio_filename, base_name, build_zip, clip_entry_name, validate_bounds,
    validate_duration, ArchiveEntry, ArchiveError, ClipSpec, ClipSpecError,
};
use crate::converter::{Converter, ConverterError, MediaInfo};
use crate::metrics::{CLIPS_EXTRACTED, CLIPS_PER_REQUEST, MEDIA_JOBS_TOTAL, MEDIA_JOB_DURATION};
use crate::workspace::Workspace;

use super::config::ProcessorConfig;
use super::error::ProcessError;
use super::types::{ClipArchive, ConvertedAudio, RequestPhase, UploadedVideo};

/// Fallback download stem for `/convert` uploads without a filename.
const DEFAULT_AUDIO_BASE: &str = "output";

/// Fallback download stem for `/clip` uploads without a filename.
const DEFAULT_CLIP_BASE: &str = "video";

/// Drives a single `/convert` or `/clip` request end to end.
///
/// Holds only read-only state, so one instance is shared by all requests.
pub struct MediaProcessor {
    config: ProcessorConfig,
    converter: Arc<dyn Converter>,
}

impl MediaProcessor {
    pub fn new(config: ProcessorConfig, converter: Arc<dyn Converter>) -> Self {
        Self { config, converter }
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    pub fn converter(&self) -> &Arc<dyn Converter> {
        &self.converter
    }

    /// Extracts the audio track of `upload` as MP3.
    pub async fn convert(&self, upload: UploadedVideo) -> Result<ConvertedAudio, ProcessError> {
        let started = Instant::now();
        let result = self.run_convert(upload).await;
        record_job("convert", started, &result);
        result
    }

    /// Cuts every clip out of `upload` and packages them into one ZIP.
    ///
    /// All clips are validated before the first extraction. Any failure
    /// discards the whole batch.
    pub async fn clip(
        &self,
        upload: UploadedVideo,
        clips: Vec<ClipSpec>,
    ) -> Result<ClipArchive, ProcessError> {
        let started = Instant::now();
        CLIPS_PER_REQUEST
            .with_label_values(&[])
            .observe(clips.len() as f64);
        let result = self.run_clip(upload, clips).await;
        if let Ok(archive) = &result {
            CLIPS_EXTRACTED.inc_by(archive.entries.len() as u64);
        }
        record_job("clip", started, &result);
        result
    }

    async fn run_convert(&self, upload: UploadedVideo) -> Result<ConvertedAudio, ProcessError> {
        debug!(phase = %RequestPhase::Received, bytes = upload.data.len(), "Convert request");

        debug!(phase = %RequestPhase::Validating);
        self.check_upload(&upload)?;

        let workspace = Workspace::acquire(&self.config.workspace_root).await?;
        let result = self.convert_in(&workspace, &upload).await;
        self.finish(workspace);
        result
    }

    async fn run_clip(
        &self,
        upload: UploadedVideo,
        clips: Vec<ClipSpec>,
    ) -> Result<ClipArchive, ProcessError> {
        debug!(
            phase = %RequestPhase::Received,
            bytes = upload.data.len(),
            clips = clips.len(),
            "Clip request"
        );

        debug!(phase = %RequestPhase::Validating);
        self.check_upload(&upload)?;
        if clips.is_empty() {
            return Err(ClipSpecError::Empty.into());
        }
        validate_bounds(&clips)?;

        let workspace = Workspace::acquire(&self.config.workspace_root).await?;
        let result = self.clip_in(&workspace, &upload, &clips).await;
        self.finish(workspace);
        result
    }

    fn check_upload(&self, upload: &UploadedVideo) -> Result<(), ProcessError> {
        if upload.data.is_empty() {
            return Err(ProcessError::input("No file uploaded"));
        }
        if self.config.require_video_content_type && !upload.is_video_content_type() {
            return Err(ProcessError::input(
                "Invalid file type. Please upload a video file.",
            ));
        }
        Ok(())
    }

    async fn persist(
        &self,
        workspace: &Workspace,
        upload: &UploadedVideo,
    ) -> Result<std::path::PathBuf, ProcessError> {
        let name = format!("input.{}", upload.extension());
        Ok(workspace.write_file(&name, &upload.data).await?)
    }

    async fn convert_in(
        &self,
        workspace: &Workspace,
        upload: &UploadedVideo,
    ) -> Result<ConvertedAudio, ProcessError> {
        let input_path = self.persist(workspace, upload).await?;

        debug!(phase = %RequestPhase::Processing);
        let info = self
            .converter
            .probe(&input_path)
            .await
            .map_err(ProcessError::Conversion)?;
        ensure_playable(&info).map_err(ProcessError::Conversion)?;
        if !info.has_audio() {
            return Err(ProcessError::Conversion(ConverterError::probe_failed(
                "media has no audio stream",
            )));
        }

        let result = self
            .converter
            .extract_audio(&input_path, &workspace.join("audio.mp3"))
            .await
            .map_err(ProcessError::Conversion)?;

        info!(
            "Converted {:.2}s of media to MP3 ({} bytes) in {} ms",
            info.duration_secs, result.output_size_bytes, result.duration_ms
        );

        debug!(phase = %RequestPhase::Responding);
        let data = tokio::fs::read(&result.output_path).await?;
        Ok(ConvertedAudio {
            filename: audio_filename(&base_name(upload.filename.as_deref(), DEFAULT_AUDIO_BASE)),
            data,
        })
    }

    async fn clip_in(
        &self,
        workspace: &Workspace,
        upload: &UploadedVideo,
        clips: &[ClipSpec],
    ) -> Result<ClipArchive, ProcessError> {
        let input_path = self.persist(workspace, upload).await?;

        let info = self
            .converter
            .probe(&input_path)
            .await
            .map_err(ProcessError::Probe)?;
        ensure_playable(&info).map_err(ProcessError::Probe)?;
        info!("Video loaded: duration {:.2} seconds", info.duration_secs);

        validate_duration(clips, info.duration_secs)?;

        debug!(phase = %RequestPhase::Processing);
        let base = base_name(upload.filename.as_deref(), DEFAULT_CLIP_BASE);
        let total = clips.len();
        let mut entries = Vec::with_capacity(total);

        for (index, clip) in clips.iter().enumerate() {
            let number = index + 1;
            info!(
                "Creating clip {}: start={:.2}s end={:.2}s",
                number, clip.start, clip.end
            );

            let output = workspace.join(&format!("clip_{}.mp4", number));
            let result = self
                .converter
                .extract_clip(&input_path, clip.start, clip.end, &output)
                .await
                .map_err(|source| {
                    warn!(
                        "Failed to create clip {} (start={:.2}s, end={:.2}s)",
                        number, clip.start, clip.end
                    );
                    ProcessError::Clip { number, source }
                })?;

            let name = clip_entry_name(&base, index, total);
            debug!("Clip {} created ({})", number, name);
            entries.push(ArchiveEntry {
                name,
                path: result.output_path,
            });
        }

        debug!(phase = %RequestPhase::Responding);
        let names = entries.iter().map(|e| e.name.clone()).collect();
        let data = tokio::task::spawn_blocking(move || build_zip(&entries))
            .await
            .map_err(|e| ArchiveError::Io(io::Error::other(e)))??;

        Ok(ClipArchive {
            filename: archive_filename(&base),
            entries: names,
            data,
        })
    }

    fn finish(&self, workspace: Workspace) {
        let path = workspace.path().to_path_buf();
        if let Err(e) = workspace.release() {
            warn!("Failed to release workspace {:?}: {}", path, e);
        }
        debug!(phase = %RequestPhase::Cleaned);
    }
}

fn record_job<T>(operation: &str, started: Instant, result: &Result<T, ProcessError>) {
    let outcome = match result {
        Ok(_) => "success",
        Err(e) => e.kind(),
    };
    MEDIA_JOBS_TOTAL
        .with_label_values(&[operation, outcome])
        .inc();
    MEDIA_JOB_DURATION
        .with_label_values(&[operation])
        .observe(started.elapsed().as_secs_f64());
}

/// Rejects media the tool reports as empty.
fn ensure_playable(info: &MediaInfo) -> Result<(), ConverterError> {
    if info.duration_secs > 0.0 {
        Ok(())
    } else {
        Err(ConverterError::probe_failed(
            "media has zero duration or could not be decoded",
        ))
    }
}
