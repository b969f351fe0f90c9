//! reclip - manifest-driven video clip extraction
//!
//! A JSON manifest declares which time ranges of which source videos should
//! exist as clip files. reclip reconciles that declared state against an
//! output directory, using SHA-256 content hashes to decide per clip whether
//! to produce, skip, or flag drift, and delegates the actual extraction to
//! ffmpeg.
//!
//! # Modules
//!
//! - `manifest`: data model, parsing/validation, naming, persistence
//! - `engine`: reconciliation decisions, the ffmpeg materializer, pruning
//! - `hash`: streaming SHA-256
//! - `cli`: command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Declare a clip
//! reclip add --manifest manifest.json --filename a.mp4 \
//!     --start 00:00:10 --end 00:00:20
//!
//! # Produce everything that is missing
//! reclip clip --manifest manifest.json --input-dir videos --output-dir clips
//!
//! # Audit the output directory
//! reclip validate --manifest manifest.json --input-dir videos \
//!     --output-dir clips --checksum
//! ```

pub mod cli;
pub mod engine;
pub mod hash;
pub mod manifest;

// Re-export main types at crate root for convenience
pub use engine::{
    compute_prune_set, ClipAction, ClipOutcome, FfmpegMaterializer, Materializer,
    ReconcileOptions, ReconcileReport, Reconciler,
};
pub use hash::hash_file;
pub use manifest::{save_manifest, Clip, Manifest, ManifestError, ValidationError, Video};
