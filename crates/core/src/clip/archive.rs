//! ZIP packaging of extracted clips.

use std::fs::File;
use std::io::{self, Cursor};
use std::path::PathBuf;

use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// A file to place in the archive under `name`.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    pub name: String,
    pub path: PathBuf,
}

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("failed to read {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Builds an in-memory ZIP with one deflated entry per input, in order.
///
/// Entry timestamps are fixed so that the archive structure only depends on
/// the entries themselves.
pub fn build_zip(entries: &[ArchiveEntry]) -> Result<Vec<u8>, ArchiveError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
        .unix_permissions(0o644);

    for entry in entries {
        let mut file = File::open(&entry.path).map_err(|source| ArchiveError::Read {
            path: entry.path.clone(),
            source,
        })?;
        writer.start_file(entry.name.as_str(), options)?;
        io::copy(&mut file, &mut writer)?;
    }

    Ok(writer.finish()?.into_inner())
}
