//! Command-line interface for reclip.
//!
//! Subcommands: `add` (declare a clip), `clip` (reconcile the output
//! directory against the manifest), `validate` (structural + optional
//! checksum audit), `prune` (remove orphaned outputs), `format` (sort and
//! re-save the manifest).

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use crate::engine::{
    compute_prune_set, FfmpegMaterializer, Materializer, ReconcileOptions, ReconcileReport,
    Reconciler,
};
use crate::hash::hash_file;
use crate::manifest::{is_valid_timestamp, save_manifest, Manifest};

/// reclip - manifest-driven video clip extraction
#[derive(Parser, Debug)]
#[command(name = "reclip")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Declare a new clip in the manifest
    Add {
        /// JSON manifest file
        #[arg(long)]
        manifest: PathBuf,

        /// Source video filename, relative to the input directory
        #[arg(long)]
        filename: String,

        /// Start timestamp HH:MM:SS
        #[arg(long)]
        start: String,

        /// End timestamp HH:MM:SS
        #[arg(long)]
        end: String,

        /// Do not save a *.backup of the manifest before editing
        #[arg(long)]
        no_backup: bool,
    },

    /// Produce declared clips that are missing (or drifted, with --overwrite)
    Clip {
        /// JSON manifest file
        #[arg(long)]
        manifest: PathBuf,

        /// Directory holding the original videos
        #[arg(long)]
        input_dir: PathBuf,

        /// Output directory for clips
        #[arg(long)]
        output_dir: PathBuf,

        /// Re-produce existing clips whose hash does not match the manifest
        #[arg(long)]
        overwrite: bool,

        /// Only report, do not create or modify files
        #[arg(long)]
        dryrun: bool,

        /// Do not save a *.backup of the manifest before editing
        #[arg(long)]
        no_backup: bool,

        /// ffmpeg binary to use
        #[arg(long, env = "RECLIP_FFMPEG", default_value = "ffmpeg")]
        ffmpeg: String,
    },

    /// Validate the manifest, optionally auditing clip checksums
    Validate {
        /// JSON manifest file
        #[arg(long)]
        manifest: PathBuf,

        /// Directory holding the original videos
        #[arg(long)]
        input_dir: PathBuf,

        /// Output directory for clips
        #[arg(long)]
        output_dir: PathBuf,

        /// Compare each clip's recorded checksum against the file on disk
        #[arg(long)]
        checksum: bool,
    },

    /// Delete output files that look generated but are not declared
    Prune {
        /// JSON manifest file
        #[arg(long)]
        manifest: PathBuf,

        /// Output directory for clips
        #[arg(long)]
        output_dir: PathBuf,

        /// Delete without asking for confirmation
        #[arg(long)]
        force: bool,
    },

    /// Sort the manifest by video filename and re-save it
    Format {
        /// JSON manifest file
        #[arg(long)]
        manifest: PathBuf,

        /// Do not save a *.backup of the manifest before editing
        #[arg(long)]
        no_backup: bool,
    },
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Add {
                manifest,
                filename,
                start,
                end,
                no_backup,
            } => add_clip(&manifest, &filename, &start, &end, no_backup).await,
            Commands::Clip {
                manifest,
                input_dir,
                output_dir,
                overwrite,
                dryrun,
                no_backup,
                ffmpeg,
            } => {
                clip_videos(
                    &manifest,
                    &input_dir,
                    &output_dir,
                    ReconcileOptions {
                        overwrite,
                        dry_run: dryrun,
                    },
                    no_backup,
                    &ffmpeg,
                )
                .await
            }
            Commands::Validate {
                manifest,
                input_dir,
                output_dir,
                checksum,
            } => validate_manifest(&manifest, &input_dir, &output_dir, checksum).await,
            Commands::Prune {
                manifest,
                output_dir,
                force,
            } => prune_outputs(&manifest, &output_dir, force).await,
            Commands::Format {
                manifest,
                no_backup,
            } => format_manifest(&manifest, no_backup).await,
        }
    }
}

/// Read and parse the manifest file
async fn load_manifest(path: &Path) -> Result<Manifest> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
    Ok(Manifest::parse(&text)?)
}

/// Declare a new clip and persist the manifest
async fn add_clip(
    manifest_path: &Path,
    filename: &str,
    start: &str,
    end: &str,
    no_backup: bool,
) -> Result<()> {
    for (name, value) in [("start", start), ("end", end)] {
        if !is_valid_timestamp(value) {
            anyhow::bail!(
                "Invalid {} timestamp '{}'. Should be of the form 'HH:MM:SS'",
                name,
                value
            );
        }
    }
    // Fixed-width zero-padded fields make this a chronological comparison
    if start >= end {
        anyhow::bail!("Start '{}' comes after End '{}'", start, end);
    }

    let mut manifest = load_manifest(manifest_path).await?;
    let clip_name = manifest.add_clip(filename, start, end)?;
    save_manifest(&manifest, manifest_path, !no_backup, false).await?;

    println!(
        "Added clip {} ({} -> {}) for video {}",
        clip_name, start, end, filename
    );
    Ok(())
}

/// Reconcile the output directory against the manifest
async fn clip_videos(
    manifest_path: &Path,
    input_dir: &Path,
    output_dir: &Path,
    options: ReconcileOptions,
    no_backup: bool,
    ffmpeg: &str,
) -> Result<()> {
    let materializer = FfmpegMaterializer::with_binary_path(ffmpeg);
    materializer
        .health_check()
        .await
        .context("FFmpeg is not installed")?;

    if !input_dir.is_dir() {
        anyhow::bail!("input-dir must be an already existing directory");
    }
    if !output_dir.is_dir() {
        anyhow::bail!("output-dir must be an already existing directory");
    }

    if options.overwrite {
        warn!("Will overwrite existing clips whose hash drifted");
    }

    let mut manifest = load_manifest(manifest_path).await?;
    manifest.validate(input_dir)?;

    if manifest.videos.is_empty() {
        anyhow::bail!("Nothing to process: manifest declares no videos");
    }

    let reconciler = Reconciler::new(materializer, options);
    let report = reconciler
        .reconcile(&mut manifest, input_dir, output_dir)
        .await?;

    // Dry run suppresses persistence entirely, including the backup
    save_manifest(&manifest, manifest_path, !no_backup, options.dry_run).await?;

    print_summary(&report, options.dry_run);
    if report.has_failures() {
        anyhow::bail!("{} clip(s) failed to produce", report.failed());
    }
    Ok(())
}

fn print_summary(report: &ReconcileReport, dry_run: bool) {
    if dry_run {
        println!(
            "Dry run: {} clip(s) would be produced, {} skipped",
            report.planned(),
            report.skipped()
        );
    } else {
        println!(
            "{} clip(s) produced, {} skipped, {} failed",
            report.produced(),
            report.skipped(),
            report.failed()
        );
    }
}

/// Validate the manifest; with `checksum`, audit every clip on disk
async fn validate_manifest(
    manifest_path: &Path,
    input_dir: &Path,
    output_dir: &Path,
    checksum: bool,
) -> Result<()> {
    let manifest = load_manifest(manifest_path).await?;
    manifest.validate(input_dir)?;

    if !checksum {
        println!("Skipping checksum validation");
        return Ok(());
    }

    let mut mismatches = 0usize;
    for video in manifest.videos.values() {
        for clip in video.clips.values() {
            let path = clip.path_under(output_dir);
            let actual = hash_file(&path)
                .await
                .with_context(|| format!("Failed to hash clip {}", path.display()))?;

            if clip.checksum.as_deref() != Some(actual.as_str()) {
                warn!(
                    "Mismatched checksum for clip {}. Expected {} Got {}",
                    path.display(),
                    clip.checksum.as_deref().unwrap_or("unknown"),
                    actual
                );
                mismatches += 1;
            }
        }
    }

    if mismatches > 0 {
        anyhow::bail!("{} clip(s) failed checksum validation", mismatches);
    }
    println!("OK");
    Ok(())
}

/// Compute, confirm, and delete orphaned outputs
async fn prune_outputs(manifest_path: &Path, output_dir: &Path, force: bool) -> Result<()> {
    let manifest = load_manifest(manifest_path).await?;
    let orphans = compute_prune_set(&manifest, output_dir).await?;

    if orphans.is_empty() {
        println!("Nothing to prune");
        return Ok(());
    }

    println!("Orphaned clips:");
    for path in &orphans {
        println!("  {}", path.display());
    }

    if !force && !confirm(&format!("Delete {} file(s)?", orphans.len()))? {
        println!("Aborted");
        return Ok(());
    }

    for path in &orphans {
        tokio::fs::remove_file(path)
            .await
            .with_context(|| format!("Failed to delete {}", path.display()))?;
        info!("Deleted {}", path.display());
    }

    println!("Deleted {} file(s)", orphans.len());
    Ok(())
}

/// Sort videos by filename and re-persist the manifest
async fn format_manifest(manifest_path: &Path, no_backup: bool) -> Result<()> {
    let mut manifest = load_manifest(manifest_path).await?;
    manifest.sort();
    save_manifest(&manifest, manifest_path, !no_backup, false).await?;

    println!("Formatted {}", manifest_path.display());
    Ok(())
}

/// Ask the operator a yes/no question on the terminal
fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush().context("Failed to flush stdout")?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read confirmation")?;

    Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))
}
