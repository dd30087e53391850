// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use prov_core::test_support::{artifact_registered, commit_resolved, coords, repository_registered};
use tempfile::tempdir;

fn sample_state() -> ArtifactGitState {
    let mut state = ArtifactGitState::default();
    state.apply_event(&artifact_registered("g", "a"));
    state.apply_event(&repository_registered("https://h/r.git"));
    state.apply_event(&commit_resolved("1.0", "https://h/r.git", "deadbeef"));
    state
}

fn write_raw(path: &Path, json: &str) {
    let compressed = zstd::encode_all(json.as_bytes(), 3).unwrap();
    std::fs::write(path, compressed).unwrap();
}

#[test]
fn missing_snapshot_loads_as_none() {
    let dir = tempdir().unwrap();
    assert!(load_snapshot(&dir.path().join("snapshot.zst")).unwrap().is_none());
}

#[test]
fn save_then_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.zst");
    let snapshot = Snapshot::new(7, coords("g", "a"), sample_state());

    let size = save_snapshot(&path, &snapshot).unwrap();
    assert!(size > 0);
    assert!(!path.with_extension("tmp").exists());

    let loaded = load_snapshot(&path).unwrap().unwrap();
    assert_eq!(loaded, snapshot);
}

#[test]
fn saves_rotate_at_most_three_backups() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.zst");
    for seq in 1..=5 {
        save_snapshot(&path, &Snapshot::new(seq, coords("g", "a"), sample_state())).unwrap();
    }

    assert_eq!(load_snapshot(&path).unwrap().unwrap().seq, 5);
    assert!(path.with_extension("bak").exists());
    assert!(path.with_extension("bak.2").exists());
    assert!(path.with_extension("bak.3").exists());
    assert!(!path.with_extension("bak.4").exists());

    // newest backup is the previous snapshot
    let bak = load_snapshot(&path.with_extension("bak")).unwrap().unwrap();
    assert_eq!(bak.seq, 4);
}

#[test]
fn newer_schema_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.zst");
    write_raw(
        &path,
        r#"{
            "v": 99,
            "seq": 1,
            "coordinates": {"group_id": "g", "artifact_id": "a"},
            "state": {},
            "created_at": "2025-01-01T00:00:00Z"
        }"#,
    );

    let err = load_snapshot(&path).unwrap_err();
    assert!(matches!(err, SnapshotError::Migration(MigrationError::TooNew(99, 1))));
    assert!(err.to_string().contains("snapshot version 99 is newer than supported"));
}

#[test]
fn uncompressed_file_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.zst");
    std::fs::write(&path, br#"{"v": 1}"#).unwrap();
    assert!(load_snapshot(&path).is_err());
}

#[test]
fn state_fields_default_when_absent() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.zst");
    write_raw(
        &path,
        r#"{
            "v": 1,
            "seq": 3,
            "coordinates": {"group_id": "g", "artifact_id": "a"},
            "state": {},
            "created_at": "2025-01-01T00:00:00Z"
        }"#,
    );

    let loaded = load_snapshot(&path).unwrap().unwrap();
    assert_eq!(loaded.seq, 3);
    assert_eq!(loaded.state, ArtifactGitState::default());
}
