//! Reconciliation engine: decides and drives per-clip work.
//!
//! - `materializer`: the external extraction tool behind a trait
//! - `reconcile`: decision table and sequential batch driver
//! - `prune`: orphaned-output computation

pub mod materializer;
pub mod prune;
pub mod reconcile;

pub use materializer::{FfmpegMaterializer, Materializer};
pub use prune::compute_prune_set;
pub use reconcile::{
    decide, ClipAction, ClipOutcome, ClipResult, ReconcileOptions, ReconcileReport, Reconciler,
};
