// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! prov-storage: per-artifact event journals, snapshots, and materialized state

mod journal;
mod migration;
mod partition;
mod snapshot;
mod state;

pub use journal::{Journal, JournalEntry, JournalError};
pub use migration::MigrationError;
pub use partition::{Partition, PartitionStore, StoreError, DEFAULT_SNAPSHOT_EVERY};
pub use snapshot::{load_snapshot, save_snapshot, Snapshot, SnapshotError, CURRENT_SNAPSHOT_VERSION};
pub use state::{ArtifactGitState, PendingCommit, Phase, UnresolvedWork, UNRESOLVED_BATCH};
