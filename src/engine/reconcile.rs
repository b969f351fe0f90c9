//! Reconciliation engine.
//!
//! Compares the declared state (manifest) against the actual state (output
//! directory) and brings them into agreement, one clip at a time: decide an
//! action, invoke the materializer if needed, re-hash the produced file,
//! record the new checksum on the clip. One clip is fully resolved before
//! the next is considered.
//!
//! A single clip's production failure never aborts the batch; it is
//! recorded in the report and the engine moves on.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::hash::hash_file;
use crate::manifest::{Clip, Manifest};

use super::materializer::Materializer;

/// Flags controlling a reconciliation batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReconcileOptions {
    /// Re-produce existing clips whose on-disk hash drifted from the record
    pub overwrite: bool,

    /// Report what would happen without touching the filesystem
    pub dry_run: bool,
}

/// Decision for a single clip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipAction {
    /// No output file exists; produce it
    Produce,

    /// Output exists and either overwrite is off or the hash matches
    Skip,

    /// Output exists but its hash drifted from the record; produce again
    Reproduce {
        recorded: Option<String>,
        actual: String,
    },
}

/// What happened to a single clip during the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipOutcome {
    /// Materialized successfully; the manifest now records this checksum
    Produced { checksum: String },

    /// Nothing to do
    Skipped,

    /// Dry run: production was required but suppressed
    WouldProduce,

    /// The materializer failed; the batch continued
    Failed { error: String },
}

/// Per-clip entry in a [`ReconcileReport`].
#[derive(Debug, Clone)]
pub struct ClipResult {
    pub video: String,
    pub clip: String,
    pub outcome: ClipOutcome,
}

/// Outcome of a whole batch, one entry per declared clip in manifest order.
#[derive(Debug, Default)]
pub struct ReconcileReport {
    pub results: Vec<ClipResult>,
}

impl ReconcileReport {
    pub fn produced(&self) -> usize {
        self.count(|o| matches!(o, ClipOutcome::Produced { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, ClipOutcome::Skipped))
    }

    pub fn planned(&self) -> usize {
        self.count(|o| matches!(o, ClipOutcome::WouldProduce))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, ClipOutcome::Failed { .. }))
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    fn count(&self, predicate: impl Fn(&ClipOutcome) -> bool) -> usize {
        self.results.iter().filter(|r| predicate(&r.outcome)).count()
    }
}

/// Decide what to do about one clip.
///
/// The recorded hash is only consulted when the output exists *and*
/// overwriting is allowed; with overwrite off, an existing file is trusted
/// as-is (run `validate --checksum` to audit without producing). An unknown
/// recorded checksum never matches, so overwrite mode reproduces it.
pub async fn decide(
    clip: &Clip,
    output_dir: &Path,
    overwrite: bool,
) -> Result<ClipAction, std::io::Error> {
    let dest = clip.path_under(output_dir);

    if !dest.exists() {
        return Ok(ClipAction::Produce);
    }

    if !overwrite {
        return Ok(ClipAction::Skip);
    }

    let actual = hash_file(&dest).await?;
    if clip.checksum.as_deref() == Some(actual.as_str()) {
        return Ok(ClipAction::Skip);
    }

    Ok(ClipAction::Reproduce {
        recorded: clip.checksum.clone(),
        actual,
    })
}

/// Drives a reconciliation batch through a [`Materializer`].
pub struct Reconciler<M: Materializer> {
    materializer: M,
    options: ReconcileOptions,
}

impl<M: Materializer> Reconciler<M> {
    pub fn new(materializer: M, options: ReconcileOptions) -> Self {
        Self {
            materializer,
            options,
        }
    }

    /// Reconcile every declared clip, in manifest order.
    ///
    /// Successful productions update the clip's checksum on the in-memory
    /// manifest; persisting that is the caller's job. Production failures
    /// are per-clip outcomes, never batch errors. IO failures while hashing
    /// are fatal. In dry-run mode neither the output directory nor the
    /// manifest is modified.
    pub async fn reconcile(
        &self,
        manifest: &mut Manifest,
        input_dir: &Path,
        output_dir: &Path,
    ) -> Result<ReconcileReport> {
        let mut report = ReconcileReport::default();

        for video in manifest.videos.values_mut() {
            let video_name = video.filename.clone();
            let source_path = video.path_under(input_dir);

            for clip in video.clips.values_mut() {
                let dest = clip.path_under(output_dir);

                let action = decide(clip, output_dir, self.options.overwrite)
                    .await
                    .with_context(|| {
                        format!("Failed to hash existing clip {}", dest.display())
                    })?;

                let outcome = match action {
                    ClipAction::Skip => {
                        debug!("Skipping {}", dest.display());
                        ClipOutcome::Skipped
                    }
                    ClipAction::Reproduce { recorded, actual } => {
                        warn!(
                            "Hash mismatch for clip {}. Expected {} Found {}",
                            dest.display(),
                            recorded.as_deref().unwrap_or("unknown"),
                            actual
                        );
                        self.produce(&source_path, clip, &dest).await?
                    }
                    ClipAction::Produce => self.produce(&source_path, clip, &dest).await?,
                };

                report.results.push(ClipResult {
                    video: video_name.clone(),
                    clip: clip.filename.clone(),
                    outcome,
                });
            }
        }

        Ok(report)
    }

    /// Produce one clip and record its fresh checksum.
    async fn produce(&self, source: &Path, clip: &mut Clip, dest: &Path) -> Result<ClipOutcome> {
        if self.options.dry_run {
            info!(
                "Dry run: would produce {} from {} ({} -> {})",
                dest.display(),
                source.display(),
                clip.start,
                clip.end
            );
            return Ok(ClipOutcome::WouldProduce);
        }

        info!("Producing clip {}", dest.display());
        if let Err(e) = self
            .materializer
            .extract(source, &clip.start, &clip.end, dest)
            .await
        {
            warn!("Failed to produce {}: {:#}", dest.display(), e);
            return Ok(ClipOutcome::Failed {
                error: format!("{e:#}"),
            });
        }

        let checksum = hash_file(dest)
            .await
            .with_context(|| format!("Failed to hash produced clip {}", dest.display()))?;
        clip.checksum = Some(checksum.clone());

        Ok(ClipOutcome::Produced { checksum })
    }
}
