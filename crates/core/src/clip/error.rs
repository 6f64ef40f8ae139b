//! Errors raised while reading and checking clip requests.

use std::fmt;
use thiserror::Error;

/// Field of a clip that a violation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipField {
    Start,
    End,
}

impl ClipField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
        }
    }
}

impl fmt::Display for ClipField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A clip whose time range breaks an invariant.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("clip {index}: '{field}' {reason}")]
pub struct ClipViolation {
    /// 0-based position of the clip in the request.
    pub index: usize,
    pub field: ClipField,
    pub reason: String,
}

impl ClipViolation {
    pub fn new(index: usize, field: ClipField, reason: impl Into<String>) -> Self {
        Self {
            index,
            field,
            reason: reason.into(),
        }
    }
}

/// The `clips` form field does not have the expected shape.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClipSpecError {
    #[error("invalid JSON for clips: {0}")]
    InvalidJson(String),

    #[error("clips must be a JSON array")]
    NotAnArray,

    #[error("at least one clip must be specified")]
    Empty,

    #[error("clip {index}: must be an object with 'start' and 'end'")]
    NotAnObject { index: usize },

    #[error("clip {index}: missing '{field}'")]
    MissingField { index: usize, field: &'static str },

    #[error("clip {index}: '{field}' must be a number")]
    NotANumber { index: usize, field: &'static str },

    #[error("clip {index}: unknown field '{field}'")]
    UnknownField { index: usize, field: String },
}
