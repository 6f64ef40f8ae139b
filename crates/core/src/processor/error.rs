//! Errors surfaced by the media processor.

use thiserror::Error;

use crate::clip::{ArchiveError, ClipSpecError, ClipViolation};
use crate::converter::ConverterError;

#[derive(Debug, Error)]
pub enum ProcessError {
    /// Missing or malformed upload.
    #[error("{0}")]
    Input(String),

    /// The `clips` field does not have the expected shape.
    #[error(transparent)]
    InvalidClips(#[from] ClipSpecError),

    /// A clip breaks a time-range invariant.
    #[error(transparent)]
    Validation(#[from] ClipViolation),

    /// The source could not be probed.
    #[error("Failed to read media: {0}")]
    Probe(ConverterError),

    /// Audio extraction failed.
    #[error("Error converting video: {0}")]
    Conversion(ConverterError),

    /// Extraction of one clip failed. `number` is 1-based.
    #[error("Failed to create clip {number}: {source}")]
    Clip {
        number: usize,
        #[source]
        source: ConverterError,
    },

    /// Scratch directory I/O failed.
    #[error("Workspace error: {0}")]
    Workspace(#[from] std::io::Error),

    #[error("Failed to create clips archive: {0}")]
    Archive(#[from] ArchiveError),
}

impl ProcessError {
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input(message.into())
    }

    /// Whether the request itself was at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Input(_) | Self::InvalidClips(_) | Self::Validation(_)
        )
    }

    /// Short label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Input(_) => "input",
            Self::InvalidClips(_) | Self::Validation(_) => "validation",
            Self::Probe(_) => "probe",
            Self::Conversion(_) => "conversion",
            Self::Clip { .. } => "clip",
            Self::Workspace(_) => "workspace",
            Self::Archive(_) => "archive",
        }
    }
}
