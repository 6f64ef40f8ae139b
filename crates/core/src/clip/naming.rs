//! Download and archive entry names derived from the uploaded filename.

use std::path::Path;

/// Stem of the uploaded filename, or `default` when there is none.
///
/// Directory components (either separator) are discarded.
pub fn base_name(filename: Option<&str>, default: &str) -> String {
    filename
        .map(|name| name.rsplit(['/', '\\']).next().unwrap_or(name))
        .and_then(|name| Path::new(name).file_stem())
        .map(|stem| stem.to_string_lossy().trim().to_string())
        .filter(|stem| !stem.is_empty() && stem != "." && stem != "..")
        .unwrap_or_else(|| default.to_string())
}

/// Archive entry name for clip `index` (0-based) out of `total`.
///
/// A single clip is named `<base>_clip.mp4`; otherwise entries carry a
/// 1-based suffix, `<base>_clip_<n>.mp4`.
pub fn clip_entry_name(base: &str, index: usize, total: usize) -> String {
    if total == 1 {
        format!("{}_clip.mp4", base)
    } else {
        format!("{}_clip_{}.mp4", base, index + 1)
    }
}

/// Download name of the clip archive.
pub fn archive_filename(base: &str) -> String {
    format!("{}_clips.zip", base)
}

/// Download name of the extracted audio.
pub fn audio_filename(base: &str) -> String {
    format!("{}.mp3", base)
}
