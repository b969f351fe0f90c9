//! Manifest Round-Trip Tests
//!
//! Full parse/serialize/persist cycles against real files.

use tempfile::TempDir;

use reclip::manifest::{backup_path, save_manifest, Manifest, ManifestError};

const DOC: &str = r#"{
  "version": "1",
  "videos": {
    "b.mp4": {
      "clips": {
        "b_0.mp4": {
          "start": "00:00:10",
          "end": "00:00:20",
          "sha256_checksum": "deadbeef"
        },
        "b_1.mp4": {
          "start": "00:01:00",
          "end": "00:02:00",
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
fn test_serialize_parse_is_identity() {
    let manifest = Manifest::parse(DOC).unwrap();
    let serialized = manifest.to_string_pretty().unwrap();
    assert_eq!(serialized, DOC);

    let reparsed = Manifest::parse(&serialized).unwrap();
    assert_eq!(reparsed, manifest);
}

#[tokio::test]
async fn test_add_persist_reload_cycle() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("manifest.json");

    let mut manifest = Manifest::parse(DOC).unwrap();
    let name = manifest.add_clip("a.mp4", "00:05:00", "00:06:00").unwrap();
    assert_eq!(name, "a_0.mp4");

    save_manifest(&manifest, &path, true, false).await.unwrap();

    let reloaded = Manifest::parse(&tokio::fs::read_to_string(&path).await.unwrap()).unwrap();
    assert_eq!(reloaded, manifest);
    assert_eq!(reloaded.videos["a.mp4"].clips["a_0.mp4"].checksum, None);
}

#[tokio::test]
async fn test_duplicate_add_leaves_file_unchanged() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("manifest.json");

    let mut manifest = Manifest::parse(DOC).unwrap();
    save_manifest(&manifest, &path, false, false).await.unwrap();
    let bytes_before = tokio::fs::read(&path).await.unwrap();

    let result = manifest.add_clip("b.mp4", "00:00:10", "00:00:20");
    assert!(matches!(result, Err(ManifestError::DuplicateClip { .. })));

    // Nothing persisted on rejection; the caller bails before saving
    assert_eq!(tokio::fs::read(&path).await.unwrap(), bytes_before);
    assert!(!backup_path(&path).exists());
}

#[test]
fn test_format_sorts_videos_and_keeps_clip_order() {
    let mut manifest = Manifest::parse(DOC).unwrap();
    manifest.sort();

    let videos: Vec<_> = manifest.videos.keys().cloned().collect();
    assert_eq!(videos, vec!["a.mp4", "b.mp4"]);

    let clips: Vec<_> = manifest.videos["b.mp4"].clips.keys().cloned().collect();
    assert_eq!(clips, vec!["b_0.mp4", "b_1.mp4"]);
}
