//! The `ClipSpec` record and its invariants.

use serde_json::{Map, Value};

use super::error::{ClipField, ClipSpecError, ClipViolation};

/// Shortest clip the media tool can express on its command line.
pub const MIN_CLIP_SECS: f64 = 0.000_001;

/// One requested clip, in seconds from the start of the source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipSpec {
    pub start: f64,
    pub end: f64,
}

impl ClipSpec {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }
}

/// Parses the `clips` form field: a JSON array of `{"start": n, "end": n}`.
///
/// Only the shape is checked here. Time-range invariants are checked by
/// [`validate_bounds`] and [`validate_duration`].
pub fn parse_clip_specs(raw: &str) -> Result<Vec<ClipSpec>, ClipSpecError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| ClipSpecError::InvalidJson(e.to_string()))?;

    let items = match value {
        Value::Array(items) => items,
        _ => return Err(ClipSpecError::NotAnArray),
    };

    if items.is_empty() {
        return Err(ClipSpecError::Empty);
    }

    items
        .iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(fields) => parse_one(index, fields),
            _ => Err(ClipSpecError::NotAnObject { index }),
        })
        .collect()
}

fn parse_one(index: usize, fields: &Map<String, Value>) -> Result<ClipSpec, ClipSpecError> {
    if let Some(unknown) = fields.keys().find(|k| *k != "start" && *k != "end") {
        return Err(ClipSpecError::UnknownField {
            index,
            field: unknown.clone(),
        });
    }

    let number = |field: &'static str| -> Result<f64, ClipSpecError> {
        match fields.get(field) {
            None => Err(ClipSpecError::MissingField { index, field }),
            Some(value) => value
                .as_f64()
                .ok_or(ClipSpecError::NotANumber { index, field }),
        }
    };

    Ok(ClipSpec {
        start: number("start")?,
        end: number("end")?,
    })
}

/// Checks the invariants that do not depend on the source video.
///
/// Reports the first offending clip in request order.
pub fn validate_bounds(clips: &[ClipSpec]) -> Result<(), ClipViolation> {
    for (index, clip) in clips.iter().enumerate() {
        if clip.start < 0.0 {
            return Err(ClipViolation::new(
                index,
                ClipField::Start,
                format!("must be non-negative (got {})", clip.start),
            ));
        }
        if clip.end <= clip.start {
            return Err(ClipViolation::new(
                index,
                ClipField::End,
                format!(
                    "must be greater than start (got start={}, end={})",
                    clip.start, clip.end
                ),
            ));
        }
        if ((clip.end - clip.start) / MIN_CLIP_SECS).round() < 1.0 {
            return Err(ClipViolation::new(
                index,
                ClipField::End,
                format!(
                    "must be at least {}s after start (got start={}, end={})",
                    MIN_CLIP_SECS, clip.start, clip.end
                ),
            ));
        }
    }
    Ok(())
}

/// Checks that every clip ends within the source video.
pub fn validate_duration(clips: &[ClipSpec], duration_secs: f64) -> Result<(), ClipViolation> {
    for (index, clip) in clips.iter().enumerate() {
        if clip.end > duration_secs {
            return Err(ClipViolation::new(
                index,
                ClipField::End,
                format!(
                    "({}s) exceeds video duration ({:.2}s)",
                    clip.end, duration_secs
                ),
            ));
        }
    }
    Ok(())
}
