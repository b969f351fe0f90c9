//! Prune reconciler.
//!
//! Finds files in the output directory that look like generated clips
//! (`{stem}_<digits>{ext}` of some declared video) but are not declared in
//! the manifest. Pure computation: deleting the returned set is a separate,
//! explicit step.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::Pattern;
use tokio::fs;

use crate::manifest::Manifest;

/// Compute the set of orphaned clip files under `output_dir`.
///
/// For each video the candidate pattern is `{stem}_*{ext}` with an
/// all-digits check on the ordinal part (the glob alone would also match
/// `a_7x.mp4`). Only regular files count; a matching file whose name is a
/// declared clip of that video is kept. Results are full paths, union
/// across all videos, in sorted order.
pub async fn compute_prune_set(
    manifest: &Manifest,
    output_dir: &Path,
) -> Result<BTreeSet<PathBuf>> {
    let mut orphans = BTreeSet::new();

    for video in manifest.videos.values() {
        let source = Path::new(&video.filename);
        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&video.filename);
        let ext = source
            .extension()
            .and_then(|s| s.to_str())
            .map(|e| format!(".{e}"))
            .unwrap_or_default();

        let pattern = Pattern::new(&format!("{stem}_*{ext}"))
            .with_context(|| format!("Invalid clip pattern for video {}", video.filename))?;

        let mut entries = fs::read_dir(output_dir)
            .await
            .with_context(|| format!("Failed to list {}", output_dir.display()))?;

        while let Some(entry) = entries.next_entry().await? {
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(_) => continue,
            };

            if !pattern.matches(&name)
                || !is_generated_name(&name, stem, &ext)
                || video.clips.contains_key(&name)
            {
                continue;
            }

            if entry.file_type().await?.is_file() {
                orphans.insert(entry.path());
            }
        }
    }

    Ok(orphans)
}

/// True when `name` is exactly `{stem}_<digits>{ext}`
fn is_generated_name(name: &str, stem: &str, ext: &str) -> bool {
    let ordinal = name
        .strip_prefix(stem)
        .and_then(|rest| rest.strip_prefix('_'))
        .and_then(|rest| rest.strip_suffix(ext));

    match ordinal {
        Some(digits) => !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}
