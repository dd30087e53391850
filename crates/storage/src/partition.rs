// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! On-disk layout and recovery for per-artifact partitions.
//!
//! ```text
//! {state_dir}/partitions/{group}/{artifact}/events.jsonl
//! {state_dir}/partitions/{group}/{artifact}/snapshot.zst
//! ```

use crate::journal::{Journal, JournalError};
use crate::snapshot::{load_snapshot, save_snapshot, Snapshot, SnapshotError};
use crate::state::ArtifactGitState;
use prov_core::{ArtifactCoordinates, Event};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Events between checkpoints unless configured otherwise.
pub const DEFAULT_SNAPSHOT_EVERY: u64 = 20;

const JOURNAL_FILE: &str = "events.jsonl";
const SNAPSHOT_FILE: &str = "snapshot.zst";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Journal(#[from] JournalError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error("snapshot in {dir} belongs to {found}")]
    WrongPartition { dir: PathBuf, found: ArtifactCoordinates },
}

/// Directory of all partitions under one state dir.
#[derive(Debug, Clone)]
pub struct PartitionStore {
    root: PathBuf,
    snapshot_every: u64,
}

impl PartitionStore {
    pub fn new(state_dir: &Path, snapshot_every: u64) -> Self {
        Self { root: state_dir.join("partitions"), snapshot_every: snapshot_every.max(1) }
    }

    pub fn partition_dir(&self, coords: &ArtifactCoordinates) -> PathBuf {
        self.root.join(encode_segment(&coords.group_id)).join(encode_segment(&coords.artifact_id))
    }

    /// Open a partition, creating it if needed, and recover its state from
    /// the latest snapshot plus the journal entries after it.
    pub fn open(&self, coords: &ArtifactCoordinates) -> Result<Partition, StoreError> {
        let dir = self.partition_dir(coords);
        fs::create_dir_all(&dir)?;

        let snapshot_path = dir.join(SNAPSHOT_FILE);
        let (mut state, snapshot_seq) = match load_snapshot(&snapshot_path)? {
            Some(snapshot) if &snapshot.coordinates != coords => {
                return Err(StoreError::WrongPartition { dir, found: snapshot.coordinates });
            }
            Some(snapshot) => (snapshot.state, snapshot.seq),
            None => (ArtifactGitState::default(), 0),
        };

        let journal = Journal::open(&dir.join(JOURNAL_FILE), snapshot_seq)?;
        let replay = journal.entries_after(snapshot_seq)?;
        for entry in &replay {
            state.apply_event(&entry.event);
        }

        if snapshot_seq > 0 || !replay.is_empty() {
            debug!(
                coords = %coords,
                snapshot_seq,
                replayed = replay.len(),
                "recovered partition"
            );
        }

        Ok(Partition {
            coordinates: coords.clone(),
            state,
            journal,
            snapshot_path,
            snapshot_every: self.snapshot_every,
            since_checkpoint: replay.len() as u64,
        })
    }

    /// Every partition that exists on disk, sorted.
    pub fn known_partitions(&self) -> Result<Vec<ArtifactCoordinates>, StoreError> {
        let mut found = Vec::new();
        let groups = match fs::read_dir(&self.root) {
            Ok(groups) => groups,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(found),
            Err(e) => return Err(e.into()),
        };

        for group in groups {
            let group = group?;
            if !group.file_type()?.is_dir() {
                continue;
            }
            let group_name = group.file_name().to_string_lossy().into_owned();
            for artifact in fs::read_dir(group.path())? {
                let artifact = artifact?;
                if !artifact.file_type()?.is_dir() {
                    continue;
                }
                let artifact_name = artifact.file_name().to_string_lossy().into_owned();
                match (decode_segment(&group_name), decode_segment(&artifact_name)) {
                    (Some(g), Some(a)) => found.push(ArtifactCoordinates::new(g, a)),
                    _ => warn!(
                        path = %artifact.path().display(),
                        "skipping partition dir with undecodable name"
                    ),
                }
            }
        }
        found.sort();
        Ok(found)
    }
}

/// One artifact's recovered state with its journal. Single writer.
pub struct Partition {
    coordinates: ArtifactCoordinates,
    state: ArtifactGitState,
    journal: Journal,
    snapshot_path: PathBuf,
    snapshot_every: u64,
    since_checkpoint: u64,
}

impl Partition {
    pub fn coordinates(&self) -> &ArtifactCoordinates {
        &self.coordinates
    }

    pub fn state(&self) -> &ArtifactGitState {
        &self.state
    }

    /// Durably append `events`, then apply them.
    ///
    /// State only changes after the flush succeeds, so callers can reply
    /// once this returns. Checkpoints when the cadence is reached; a failed
    /// checkpoint is logged and retried on the next persist.
    pub fn persist(&mut self, events: &[Event]) -> Result<(), StoreError> {
        if events.is_empty() {
            return Ok(());
        }
        let written = events
            .iter()
            .try_for_each(|event| self.journal.append(event).map(|_| ()))
            .and_then(|()| self.journal.flush());
        if let Err(e) = written {
            self.journal.discard_pending();
            return Err(e.into());
        }

        for event in events {
            self.state.apply_event(event);
        }
        self.since_checkpoint += events.len() as u64;

        if self.since_checkpoint >= self.snapshot_every {
            if let Err(e) = self.checkpoint() {
                warn!(coords = %self.coordinates, error = %e, "checkpoint failed");
            }
        }
        Ok(())
    }

    /// Write a snapshot at the current sequence and drop the journal
    /// entries it covers.
    pub fn checkpoint(&mut self) -> Result<(), StoreError> {
        self.journal.flush()?;
        let seq = self.journal.write_seq();
        let snapshot = Snapshot::new(seq, self.coordinates.clone(), self.state.clone());
        let size_bytes = save_snapshot(&self.snapshot_path, &snapshot)?;
        self.journal.truncate_before(seq + 1)?;
        self.since_checkpoint = 0;
        info!(coords = %self.coordinates, seq, size_bytes, "checkpointed partition");
        Ok(())
    }

    pub fn write_seq(&self) -> u64 {
        self.journal.write_seq()
    }

    /// True when events were persisted since the last checkpoint.
    pub fn is_dirty(&self) -> bool {
        self.since_checkpoint > 0
    }
}

/// Escape a coordinate segment into a safe directory name. Keeps
/// `[A-Za-z0-9._-]`, percent-encodes everything else, plus a leading `.`.
fn encode_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for (i, byte) in segment.bytes().enumerate() {
        let keep = byte.is_ascii_alphanumeric()
            || byte == b'_'
            || byte == b'-'
            || (byte == b'.' && i > 0);
        if keep {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

fn decode_segment(name: &str) -> Option<String> {
    let bytes = name.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = std::str::from_utf8(bytes.get(i + 1..i + 3)?).ok()?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

#[cfg(test)]
#[path = "partition_tests.rs"]
mod tests;
