// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Snapshot persistence for one partition.
//!
//! A snapshot stores the materialized state at a journal sequence number.
//! Recovery loads it and replays journal entries after that sequence.

use crate::migration::{MigrationError, MigrationRegistry};
use crate::state::ArtifactGitState;
use chrono::{DateTime, Utc};
use prov_core::ArtifactCoordinates;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Current snapshot schema version
pub const CURRENT_SNAPSHOT_VERSION: u32 = 1;

const ZSTD_LEVEL: i32 = 3;
const MAX_BAK_FILES: u32 = 3;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("migration error: {0}")]
    Migration(#[from] MigrationError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Schema version for migrations
    #[serde(rename = "v")]
    pub version: u32,
    /// Journal sequence number covered by this snapshot
    pub seq: u64,
    pub coordinates: ArtifactCoordinates,
    pub state: ArtifactGitState,
    pub created_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(seq: u64, coordinates: ArtifactCoordinates, state: ArtifactGitState) -> Self {
        Self { version: CURRENT_SNAPSHOT_VERSION, seq, coordinates, state, created_at: Utc::now() }
    }
}

/// Write `snapshot` to `path` atomically, rotating any previous snapshot
/// into `.bak` files. Returns the compressed size in bytes.
pub fn save_snapshot(path: &Path, snapshot: &Snapshot) -> Result<u64, SnapshotError> {
    let json = serde_json::to_vec(snapshot)?;
    let compressed = zstd::encode_all(json.as_slice(), ZSTD_LEVEL)?;

    let tmp = path.with_extension("tmp");
    {
        let mut file = File::create(&tmp)?;
        file.write_all(&compressed)?;
        file.sync_all()?;
    }

    if path.exists() {
        fs::rename(path, rotate_bak_path(path))?;
    }
    fs::rename(&tmp, path)?;
    Ok(compressed.len() as u64)
}

/// Load the snapshot at `path`, migrating older schemas.
///
/// Returns `Ok(None)` when no snapshot exists yet.
pub fn load_snapshot(path: &Path) -> Result<Option<Snapshot>, SnapshotError> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut json = Vec::new();
    zstd::stream::Decoder::new(file)?.read_to_end(&mut json)?;

    let raw: serde_json::Value = serde_json::from_slice(&json)?;
    let migrated = MigrationRegistry::new().migrate_to(raw, CURRENT_SNAPSHOT_VERSION)?;
    Ok(Some(serde_json::from_value(migrated)?))
}

/// Pick the next `.bak` / `.bak.N` path, rotating older backups out.
///
/// Keeps up to [`MAX_BAK_FILES`] backups: `.bak`, `.bak.2`, `.bak.3`.
pub(crate) fn rotate_bak_path(path: &Path) -> PathBuf {
    let bak = |n: u32| {
        if n == 1 {
            path.with_extension("bak")
        } else {
            path.with_extension(format!("bak.{n}"))
        }
    };

    let oldest = bak(MAX_BAK_FILES);
    if oldest.exists() {
        let _ = fs::remove_file(&oldest);
    }

    for n in (1..MAX_BAK_FILES).rev() {
        let src = bak(n);
        if src.exists() {
            let _ = fs::rename(&src, bak(n + 1));
        }
    }

    bak(1)
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
