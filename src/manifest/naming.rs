//! Clip naming policy.
//!
//! Clip filenames are derived from the source filename and an ordinal:
//! `video.mp4` yields `video_0.mp4`, `video_1.mp4`, and so on. The first
//! free ordinal wins, so a manually deleted entry's name is reused.

use std::path::Path;

use indexmap::IndexMap;

use super::model::Clip;

/// Generate the next free clip filename for a source video.
///
/// Takes the stem and extension of `video_filename` (any directory
/// components are dropped) and scans ordinals `0, 1, 2, …` for the first
/// `{stem}_{ordinal}{ext}` not already present in `existing`. The result is
/// unique within `existing` at the moment of the call; there is no
/// protection against concurrent callers racing on the same video.
pub fn generate_clip_name(video_filename: &str, existing: &IndexMap<String, Clip>) -> String {
    let path = Path::new(video_filename);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(video_filename);
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();

    let mut ordinal: u32 = 0;
    loop {
        let candidate = format!("{stem}_{ordinal}{ext}");
        if !existing.contains_key(&candidate) {
            return candidate;
        }
        ordinal += 1;
    }
}
