//! Manifest data model.
//!
//! A manifest is the declarative description of every clip that should
//! exist: a map of source videos, each owning a map of declared clips with
//! their time range and the SHA-256 checksum recorded at production time.
//!
//! Parsing is structural only (which keys must exist); semantic checks
//! (source files present, timestamp grammar) live in [`Manifest::validate`]
//! so a manifest can be loaded, inspected, and edited even when its
//! referenced files are elsewhere.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

use super::naming::generate_clip_name;
use super::timestamp::is_valid_timestamp;

/// Sentinel written to the document when a clip has never been produced.
/// Exists only at the serialization boundary; internal code uses `Option`.
pub const UNKNOWN_CHECKSUM: &str = "none";

/// Structural defects in a manifest document, and duplicate declarations.
///
/// Every variant names the offending entry so the operator can find it in
/// the file without a line number.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("invalid JSON in manifest: {0}")]
    Json(#[from] serde_json::Error),

    #[error("manifest root must be a JSON object")]
    NotAnObject,

    #[error("missing 'version' in manifest")]
    MissingVersion,

    #[error("missing 'videos' in manifest")]
    MissingVideos,

    #[error("video entry {video} must be a JSON object")]
    VideoNotAnObject { video: String },

    #[error("missing 'clips' in video entry {video}")]
    MissingClips { video: String },

    #[error("clip entry {clip} must be a JSON object")]
    ClipNotAnObject { clip: String },

    #[error("missing '{field}' timestamp of the form 'HH:MM:SS' for clip {clip}")]
    MissingTimestamp { field: &'static str, clip: String },

    #[error("clip {existing} already covers {start} -> {end} for video {video}")]
    DuplicateClip {
        video: String,
        existing: String,
        start: String,
        end: String,
    },
}

/// Semantic validation failures. First offender short-circuits.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("could not locate original file {video} at path {path}")]
    SourceNotFound { video: String, path: PathBuf },

    #[error("invalid '{field}' timestamp '{value}' for clip {clip}; should be of the form 'HH:MM:SS'")]
    BadTimestamp {
        field: &'static str,
        clip: String,
        value: String,
    },
}

/// One declared output clip: a time range of its video plus the checksum
/// recorded after the last successful production.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Clip {
    /// Output filename, relative to the output directory (also the map key)
    #[serde(skip)]
    pub filename: String,

    /// Start timestamp, `HH:MM:SS`
    pub start: String,

    /// End timestamp, `HH:MM:SS`
    pub end: String,

    /// SHA-256 of the produced file; `None` until first production
    #[serde(rename = "sha256_checksum", serialize_with = "serialize_checksum")]
    pub checksum: Option<String>,
}

fn serialize_checksum<S: Serializer>(
    checksum: &Option<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(checksum.as_deref().unwrap_or(UNKNOWN_CHECKSUM))
}

impl Clip {
    /// Path of this clip under the output directory
    pub fn path_under(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(&self.filename)
    }
}

/// One source video and the clips declared against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Video {
    /// Source filename, relative to the input directory (also the map key)
    #[serde(skip)]
    pub filename: String,

    /// Declared clips, keyed by clip filename, in insertion order
    pub clips: IndexMap<String, Clip>,
}

impl Video {
    /// Path of this video under the input directory
    pub fn path_under(&self, input_dir: &Path) -> PathBuf {
        input_dir.join(&self.filename)
    }
}

/// The full declarative manifest: every video and every declared clip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Manifest {
    /// Forward-compatibility tag; carried through, never interpreted
    pub version: String,

    /// Source videos, keyed by filename, in insertion order
    pub videos: IndexMap<String, Video>,
}

impl Manifest {
    /// Create an empty manifest with the given version tag
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            videos: IndexMap::new(),
        }
    }

    /// Parse a manifest document, failing fast on the first structural
    /// defect.
    ///
    /// Requires `version` and `videos` at the top level, `clips` in every
    /// video entry, and `start`/`end` in every clip entry. A missing
    /// `sha256_checksum` (or the `"none"` sentinel) becomes an unknown
    /// checksum. Timestamp format is deliberately not checked here; run
    /// [`Manifest::validate`] for that.
    pub fn parse(text: &str) -> Result<Self, ManifestError> {
        let document: Value = serde_json::from_str(text)?;
        let root = document.as_object().ok_or(ManifestError::NotAnObject)?;

        let version = root
            .get("version")
            .and_then(Value::as_str)
            .ok_or(ManifestError::MissingVersion)?
            .to_string();

        let videos_json = root
            .get("videos")
            .and_then(Value::as_object)
            .ok_or(ManifestError::MissingVideos)?;

        let mut videos = IndexMap::new();
        for (video_name, video_json) in videos_json {
            let video_obj =
                video_json
                    .as_object()
                    .ok_or_else(|| ManifestError::VideoNotAnObject {
                        video: video_name.clone(),
                    })?;

            let clips_json = video_obj
                .get("clips")
                .and_then(Value::as_object)
                .ok_or_else(|| ManifestError::MissingClips {
                    video: video_name.clone(),
                })?;

            let mut clips = IndexMap::new();
            for (clip_name, clip_json) in clips_json {
                let clip_obj =
                    clip_json
                        .as_object()
                        .ok_or_else(|| ManifestError::ClipNotAnObject {
                            clip: clip_name.clone(),
                        })?;

                let timestamp = |field: &'static str| -> Result<String, ManifestError> {
                    clip_obj
                        .get(field)
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .ok_or(ManifestError::MissingTimestamp {
                            field,
                            clip: clip_name.clone(),
                        })
                };

                let start = timestamp("start")?;
                let end = timestamp("end")?;

                let checksum = clip_obj
                    .get("sha256_checksum")
                    .and_then(Value::as_str)
                    .filter(|s| *s != UNKNOWN_CHECKSUM)
                    .map(str::to_string);

                clips.insert(
                    clip_name.clone(),
                    Clip {
                        filename: clip_name.clone(),
                        start,
                        end,
                        checksum,
                    },
                );
            }

            videos.insert(
                video_name.clone(),
                Video {
                    filename: video_name.clone(),
                    clips,
                },
            );
        }

        Ok(Self { version, videos })
    }

    /// Serialize the manifest to pretty-printed JSON.
    ///
    /// Field order is deterministic (`version` before `videos`; `start`,
    /// `end`, `sha256_checksum` within a clip) and videos/clips keep their
    /// stored order.
    pub fn to_string_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Check that every video file exists under `input_dir` and every clip
    /// timestamp satisfies the grammar. The first failure wins.
    pub fn validate(&self, input_dir: &Path) -> Result<(), ValidationError> {
        for video in self.videos.values() {
            let path = video.path_under(input_dir);
            if !path.is_file() {
                return Err(ValidationError::SourceNotFound {
                    video: video.filename.clone(),
                    path,
                });
            }

            for clip in video.clips.values() {
                for (field, value) in [("start", &clip.start), ("end", &clip.end)] {
                    if !is_valid_timestamp(value) {
                        return Err(ValidationError::BadTimestamp {
                            field,
                            clip: clip.filename.clone(),
                            value: value.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Declare a new clip for a video, creating the video entry on first
    /// reference.
    ///
    /// An exact duplicate `(start, end)` pair for the same video is
    /// rejected and the manifest is left unchanged. Overlapping but
    /// non-identical ranges are permitted. Returns the generated clip
    /// filename.
    pub fn add_clip(
        &mut self,
        filename: &str,
        start: &str,
        end: &str,
    ) -> Result<String, ManifestError> {
        let video = self
            .videos
            .entry(filename.to_string())
            .or_insert_with(|| Video {
                filename: filename.to_string(),
                clips: IndexMap::new(),
            });

        if let Some(existing) = video
            .clips
            .values()
            .find(|c| c.start == start && c.end == end)
        {
            return Err(ManifestError::DuplicateClip {
                video: filename.to_string(),
                existing: existing.filename.clone(),
                start: start.to_string(),
                end: end.to_string(),
            });
        }

        let clip_name = generate_clip_name(filename, &video.clips);
        video.clips.insert(
            clip_name.clone(),
            Clip {
                filename: clip_name.clone(),
                start: start.to_string(),
                end: end.to_string(),
                checksum: None,
            },
        );

        Ok(clip_name)
    }

    /// Reorder videos by filename ascending. Clip order within a video is
    /// left alone.
    pub fn sort(&mut self) {
        self.videos.sort_keys();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
  "version": "1",
  "videos": {
    "b.mp4": {
      "clips": {
        "b_0.mp4": {
          "start": "00:00:10",
          "end": "00:00:20",
          "sha256_checksum": "none"
        }
      }
    },
    "a.mp4": {
      "clips": {}
    }
  }
}"#;

    #[test]
    fn test_parse_preserves_order_and_sentinel() {
        let manifest = Manifest::parse(DOC).unwrap();
        assert_eq!(manifest.version, "1");
        let names: Vec<_> = manifest.videos.keys().cloned().collect();
        assert_eq!(names, vec!["b.mp4", "a.mp4"]);

        let clip = &manifest.videos["b.mp4"].clips["b_0.mp4"];
        assert_eq!(clip.start, "00:00:10");
        assert_eq!(clip.end, "00:00:20");
        assert_eq!(clip.checksum, None);
    }

    #[test]
    fn test_parse_defaults_missing_checksum() {
        let doc = r#"{"version":"1","videos":{"a.mp4":{"clips":{"a_0.mp4":{"start":"00:00:00","end":"00:00:01"}}}}}"#;
        let manifest = Manifest::parse(doc).unwrap();
        assert_eq!(manifest.videos["a.mp4"].clips["a_0.mp4"].checksum, None);
    }

    #[test]
    fn test_parse_missing_version() {
        let result = Manifest::parse(r#"{"videos":{}}"#);
        assert!(matches!(result, Err(ManifestError::MissingVersion)));
    }

    #[test]
    fn test_parse_missing_videos() {
        let result = Manifest::parse(r#"{"version":"1"}"#);
        assert!(matches!(result, Err(ManifestError::MissingVideos)));
    }

    #[test]
    fn test_parse_missing_clips_names_video() {
        let result = Manifest::parse(r#"{"version":"1","videos":{"a.mp4":{}}}"#);
        match result {
            Err(ManifestError::MissingClips { video }) => assert_eq!(video, "a.mp4"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_parse_missing_timestamp_names_clip() {
        let doc = r#"{"version":"1","videos":{"a.mp4":{"clips":{"a_0.mp4":{"end":"00:00:01"}}}}}"#;
        match Manifest::parse(doc) {
            Err(ManifestError::MissingTimestamp { field, clip }) => {
                assert_eq!(field, "start");
                assert_eq!(clip, "a_0.mp4");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_roundtrip() {
        let manifest = Manifest::parse(DOC).unwrap();
        let serialized = manifest.to_string_pretty().unwrap();
        let reparsed = Manifest::parse(&serialized).unwrap();
        assert_eq!(manifest, reparsed);

        // Stable across a second pass (canonical form is a fixed point)
        assert_eq!(serialized, reparsed.to_string_pretty().unwrap());
    }

    #[test]
    fn test_serializer_writes_sentinel() {
        let mut manifest = Manifest::new("1");
        manifest.add_clip("a.mp4", "00:00:00", "00:00:01").unwrap();
        let serialized = manifest.to_string_pretty().unwrap();
        assert!(serialized.contains(r#""sha256_checksum": "none""#));
    }

    #[test]
    fn test_duplicate_clip_rejected() {
        let mut manifest = Manifest::new("1");
        let first = manifest.add_clip("a.mp4", "00:00:10", "00:00:20").unwrap();
        assert_eq!(first, "a_0.mp4");

        let before = manifest.clone();
        let result = manifest.add_clip("a.mp4", "00:00:10", "00:00:20");
        match result {
            Err(ManifestError::DuplicateClip { existing, .. }) => {
                assert_eq!(existing, "a_0.mp4")
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(manifest, before);
    }

    #[test]
    fn test_overlapping_ranges_permitted() {
        let mut manifest = Manifest::new("1");
        manifest.add_clip("a.mp4", "00:00:10", "00:00:20").unwrap();
        let second = manifest.add_clip("a.mp4", "00:00:15", "00:00:25").unwrap();
        assert_eq!(second, "a_1.mp4");
    }

    #[test]
    fn test_sort_orders_videos_only() {
        let mut manifest = Manifest::parse(DOC).unwrap();
        manifest.sort();
        let names: Vec<_> = manifest.videos.keys().cloned().collect();
        assert_eq!(names, vec!["a.mp4", "b.mp4"]);
    }

    #[test]
    fn test_validate_reports_bad_timestamp() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.mp4"), b"x").unwrap();

        let doc = r#"{"version":"1","videos":{"a.mp4":{"clips":{"a_0.mp4":{"start":"0:00:00","end":"00:00:01"}}}}}"#;
        let manifest = Manifest::parse(doc).unwrap();
        match manifest.validate(dir.path()) {
            Err(ValidationError::BadTimestamp { field, clip, .. }) => {
                assert_eq!(field, "start");
                assert_eq!(clip, "a_0.mp4");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_validate_reports_missing_source() {
        let dir = tempfile::TempDir::new().unwrap();
        let manifest = Manifest::parse(DOC).unwrap();
        match manifest.validate(dir.path()) {
            Err(ValidationError::SourceNotFound { video, .. }) => {
                assert_eq!(video, "b.mp4")
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
