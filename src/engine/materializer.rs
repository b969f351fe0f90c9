//! Clip materializer: the external tool that actually cuts video.
//!
//! The engine only needs a narrow contract (extract a time range of a
//! source into a destination file, or fail with a diagnostic), expressed as
//! the [`Materializer`] trait. Production uses ffmpeg in stream-copy mode;
//! tests substitute a fake.

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::process::Command;

/// Contract for producing a clip file from a time range of a source.
///
/// Implementations must either leave a complete file at `dest` or fail;
/// the engine never cleans up partial output itself.
#[async_trait]
pub trait Materializer: Send + Sync {
    /// Extract `[start, end]` of `source` into `dest`, overwriting it.
    async fn extract(&self, source: &Path, start: &str, end: &str, dest: &Path) -> Result<()>;

    /// Check the backing tool is available
    async fn health_check(&self) -> Result<()>;
}

/// Materializer backed by the `ffmpeg` CLI.
///
/// Uses `-c copy` (no re-encode), so clip boundaries snap to the nearest
/// keyframes and extraction is fast.
pub struct FfmpegMaterializer {
    /// Path to the ffmpeg binary (default: "ffmpeg")
    binary_path: String,
}

impl Default for FfmpegMaterializer {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegMaterializer {
    /// Create a materializer using `ffmpeg` from PATH
    pub fn new() -> Self {
        Self {
            binary_path: "ffmpeg".to_string(),
        }
    }

    /// Create a materializer with a custom ffmpeg binary path
    pub fn with_binary_path(binary_path: impl Into<String>) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }
}

#[async_trait]
impl Materializer for FfmpegMaterializer {
    async fn extract(&self, source: &Path, start: &str, end: &str, dest: &Path) -> Result<()> {
        let output = Command::new(&self.binary_path)
            .args(["-ss", start, "-to", end, "-i"])
            .arg(source)
            .args(["-c", "copy"])
            .arg(dest)
            .arg("-y")
            .output()
            .await
            .with_context(|| format!("Failed to spawn {} for {}", self.binary_path, dest.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let exit_code = output.status.code().unwrap_or(-1);
            anyhow::bail!(
                "ffmpeg failed with exit code {} for {}: {}",
                exit_code,
                dest.display(),
                stderr.trim()
            );
        }

        Ok(())
    }

    async fn health_check(&self) -> Result<()> {
        let output = Command::new(&self.binary_path)
            .arg("-version")
            .output()
            .await
            .with_context(|| format!("Failed to run {}", self.binary_path))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("ffmpeg health check failed: {}", stderr.trim());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_binary_path() {
        let materializer = FfmpegMaterializer::new();
        assert_eq!(materializer.binary_path, "ffmpeg");
    }

    #[test]
    fn test_custom_binary_path() {
        let materializer = FfmpegMaterializer::with_binary_path("/opt/ffmpeg/bin/ffmpeg");
        assert_eq!(materializer.binary_path, "/opt/ffmpeg/bin/ffmpeg");
    }

    #[tokio::test]
    async fn test_health_check_missing_binary() {
        let materializer = FfmpegMaterializer::with_binary_path("definitely-not-ffmpeg");
        assert!(materializer.health_check().await.is_err());
    }
}
