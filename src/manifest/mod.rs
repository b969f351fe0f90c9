//! Manifest model: the declared state of the clip library.
//!
//! - `model`: typed Manifest/Video/Clip, parsing, validation, serialization
//! - `naming`: deterministic clip filename generation
//! - `timestamp`: the `HH:MM:SS` grammar
//! - `persist`: save-with-backup persistence gate

pub mod model;
pub mod naming;
pub mod persist;
pub mod timestamp;

pub use model::{Clip, Manifest, ManifestError, ValidationError, Video};
pub use naming::generate_clip_name;
pub use persist::{backup_path, save_manifest};
pub use timestamp::is_valid_timestamp;
