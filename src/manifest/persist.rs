//! Manifest persistence.
//!
//! Saving is overwrite-in-place with an optional `.backup` copy of the
//! previous contents taken first. Under dry-run nothing on disk changes.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;
use tracing::debug;

use super::model::Manifest;

/// Sibling path carrying the pre-save copy: `<path>.backup`
pub fn backup_path(path: &Path) -> PathBuf {
    let mut os: OsString = path.as_os_str().to_owned();
    os.push(".backup");
    PathBuf::from(os)
}

/// Serialize and persist the manifest.
///
/// With `make_backup`, the existing file is first copied to
/// [`backup_path`]; a missing prior file (first-ever save) skips the copy,
/// any other copy failure is an error. With `dry_run`, this is a no-op and
/// the manifest file's bytes are guaranteed untouched.
pub async fn save_manifest(
    manifest: &Manifest,
    path: &Path,
    make_backup: bool,
    dry_run: bool,
) -> Result<()> {
    if dry_run {
        // Nothing was modified, so there is nothing to save
        return Ok(());
    }

    if make_backup {
        let backup = backup_path(path);
        match fs::copy(path, &backup).await {
            Ok(_) => debug!("Backed up manifest to {}", backup.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No existing manifest at {}, skipping backup", path.display());
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to back up manifest to {}", backup.display())
                });
            }
        }
    }

    let serialized = manifest
        .to_string_pretty()
        .context("Failed to serialize manifest")?;

    fs::write(path, format!("{serialized}\n"))
        .await
        .with_context(|| format!("Failed to write manifest: {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dry_run_touches_nothing() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("manifest.json");
        fs::write(&path, "original").await.unwrap();

        let manifest = Manifest::new("1");
        save_manifest(&manifest, &path, true, true).await.unwrap();

        assert_eq!(fs::read_to_string(&path).await.unwrap(), "original");
        assert!(!backup_path(&path).exists());
    }

    #[tokio::test]
    async fn test_backup_holds_previous_contents() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("manifest.json");
        fs::write(&path, "previous").await.unwrap();

        let manifest = Manifest::new("1");
        save_manifest(&manifest, &path, true, false).await.unwrap();

        assert_eq!(
            fs::read_to_string(backup_path(&path)).await.unwrap(),
            "previous"
        );
        let saved = fs::read_to_string(&path).await.unwrap();
        assert!(saved.contains(r#""version": "1""#));
    }

    #[tokio::test]
    async fn test_first_save_without_prior_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("manifest.json");

        let manifest = Manifest::new("1");
        save_manifest(&manifest, &path, true, false).await.unwrap();

        assert!(path.exists());
        assert!(!backup_path(&path).exists());
    }

    #[tokio::test]
    async fn test_no_backup_flag() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("manifest.json");
        fs::write(&path, "previous").await.unwrap();

        let manifest = Manifest::new("1");
        save_manifest(&manifest, &path, false, false).await.unwrap();

        assert!(!backup_path(&path).exists());
    }

    #[tokio::test]
    async fn test_saved_manifest_reparses() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("manifest.json");

        let mut manifest = Manifest::new("1");
        manifest.add_clip("a.mp4", "00:00:10", "00:00:20").unwrap();
        save_manifest(&manifest, &path, false, false).await.unwrap();

        let text = fs::read_to_string(&path).await.unwrap();
        let reloaded = Manifest::parse(&text).unwrap();
        assert_eq!(reloaded, manifest);
    }
}
