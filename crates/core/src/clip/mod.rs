//! Clip requests: parsing, validation, naming and packaging.

mod archive;
mod error;
mod naming;
mod spec;

pub use archive::{build_zip, ArchiveEntry, ArchiveError};
pub use error::{ClipField, ClipSpecError, ClipViolation};
pub use naming::{archive_filename, audio_filename, base_name, clip_entry_name};
pub use spec::{parse_clip_specs, validate_bounds, validate_duration, ClipSpec};
