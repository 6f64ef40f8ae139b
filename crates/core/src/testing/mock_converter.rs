//! Mock converter for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::fixtures;
use crate::converter::{
    ConversionJob, ConversionResult, ConversionTask, Converter, ConverterError, MediaInfo,
};

/// Duration reported by a fresh mock, in seconds.
const DEFAULT_DURATION_SECS: f64 = 60.0;

/// A recorded call for test assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    Probe {
        path: PathBuf,
    },
    Convert {
        task: ConversionTask,
        input_path: PathBuf,
        output_path: PathBuf,
        success: bool,
    },
}

impl MockCall {
    pub fn input_path(&self) -> &Path {
        match self {
            Self::Probe { path } => path,
            Self::Convert { input_path, .. } => input_path,
        }
    }
}

#[derive(Debug, Default)]
struct Failures {
    probe: Option<String>,
    conversions: Option<String>,
    /// 1-based index among clip extractions, with the diagnostic to report.
    clip: Option<(usize, String)>,
}

/// Mock implementation of the Converter trait.
///
/// Provides controllable behavior for testing:
/// - Report a configurable media duration
/// - Record every probe and conversion
/// - Simulate tool failures with a diagnostic
///
/// Conversions write small placeholder files so the caller can read and
/// package them like real output.
#[derive(Debug)]
pub struct MockConverter {
    calls: Arc<RwLock<Vec<MockCall>>>,
    duration_secs: f64,
    failures: Arc<RwLock<Failures>>,
    clips_seen: Arc<RwLock<usize>>,
}

impl Default for MockConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl MockConverter {
    /// Create a new mock converter.
    pub fn new() -> Self {
        Self::with_duration(DEFAULT_DURATION_SECS)
    }

    /// Create a mock that reports `duration_secs` for every probed file.
    pub fn with_duration(duration_secs: f64) -> Self {
        Self {
            calls: Arc::new(RwLock::new(Vec::new())),
            duration_secs,
            failures: Arc::new(RwLock::new(Failures::default())),
            clips_seen: Arc::new(RwLock::new(0)),
        }
    }

    /// Make every probe fail as undecodable input.
    pub async fn fail_probe(&self, diagnostic: &str) {
        self.failures.write().await.probe = Some(diagnostic.to_string());
    }

    /// Make every conversion fail.
    pub async fn fail_conversions(&self, diagnostic: &str) {
        self.failures.write().await.conversions = Some(diagnostic.to_string());
    }

    /// Make the `number`-th clip extraction (1-based) fail.
    pub async fn fail_clip_number(&self, number: usize, diagnostic: &str) {
        self.failures.write().await.clip = Some((number, diagnostic.to_string()));
    }

    /// All recorded calls, oldest first.
    pub async fn calls(&self) -> Vec<MockCall> {
        self.calls.read().await.clone()
    }

    pub async fn probe_count(&self) -> usize {
        self.calls
            .read()
            .await
            .iter()
            .filter(|c| matches!(c, MockCall::Probe { .. }))
            .count()
    }

    /// Number of conversions attempted, failed ones included.
    pub async fn conversion_count(&self) -> usize {
        self.calls
            .read()
            .await
            .iter()
            .filter(|c| matches!(c, MockCall::Convert { .. }))
            .count()
    }

    /// Distinct directories the inputs were read from, in call order.
    pub async fn input_dirs(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = Vec::new();
        for call in self.calls.read().await.iter() {
            if let Some(parent) = call.input_path().parent() {
                if !dirs.iter().any(|d| d == parent) {
                    dirs.push(parent.to_path_buf());
                }
            }
        }
        dirs
    }

    /// Take the failure that applies to `task`, if any.
    async fn failure_for(&self, task: &ConversionTask) -> Option<String> {
        let failures = self.failures.read().await;
        if let Some(diagnostic) = &failures.conversions {
            return Some(diagnostic.clone());
        }
        if let ConversionTask::Clip { .. } = task {
            let mut seen = self.clips_seen.write().await;
            *seen += 1;
            if let Some((number, diagnostic)) = &failures.clip {
                if *number == *seen {
                    return Some(diagnostic.clone());
                }
            }
        }
        None
    }

    fn placeholder_bytes(task: &ConversionTask) -> Vec<u8> {
        match task {
            ConversionTask::Audio => b"ID3\x04\x00mock-mp3-frames".to_vec(),
            ConversionTask::Clip {
                start_secs,
                end_secs,
            } => format!("mock clip {}-{}", start_secs, end_secs).into_bytes(),
        }
    }
}

#[async_trait]
impl Converter for MockConverter {
    fn name(&self) -> &str {
        "mock"
    }

    async fn probe(&self, path: &Path) -> Result<MediaInfo, ConverterError> {
        self.calls.write().await.push(MockCall::Probe {
            path: path.to_path_buf(),
        });

        if !path.exists() {
            return Err(ConverterError::InputNotFound {
                path: path.to_path_buf(),
            });
        }
        if let Some(diagnostic) = &self.failures.read().await.probe {
            return Err(ConverterError::probe_failed(diagnostic.clone()));
        }

        let duration = self.duration_secs;
        Ok(fixtures::video_info(path, duration))
    }

    async fn convert(&self, job: ConversionJob) -> Result<ConversionResult, ConverterError> {
        let failure = if job.input_path.exists() {
            self.failure_for(&job.task).await
        } else {
            Some(format!("{}: No such file or directory", job.input_path.display()))
        };

        self.calls.write().await.push(MockCall::Convert {
            task: job.task.clone(),
            input_path: job.input_path.clone(),
            output_path: job.output_path.clone(),
            success: failure.is_none(),
        });

        if let Some(diagnostic) = failure {
            return Err(ConverterError::conversion_failed(
                "FFmpeg exited with code 1",
                Some(diagnostic),
            ));
        }

        let data = Self::placeholder_bytes(&job.task);
        tokio::fs::write(&job.output_path, &data).await?;

        Ok(ConversionResult {
            job_id: job.job_id,
            output_path: job.output_path,
            output_size_bytes: data.len() as u64,
            duration_ms: 0,
        })
    }

    async fn validate(&self) -> Result<(), ConverterError> {
        Ok(())
    }
}
