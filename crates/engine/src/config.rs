// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tunables for the resolution pipeline.

use prov_storage::{DEFAULT_SNAPSHOT_EVERY, UNRESOLVED_BATCH};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Root for partitions and the outbox.
    pub state_dir: PathBuf,
    /// Where disposable checkouts are cloned.
    pub scratch_dir: PathBuf,
    /// Bound on one clone session, as seen by the resolver.
    pub clone_timeout: Duration,
    /// Bound on searching one checkout. The scheduler allows a request
    /// `clone_timeout` plus this.
    pub resolve_timeout: Duration,
    /// Bound on simple artifact state queries and commands.
    pub query_timeout: Duration,
    pub resync_interval: Duration,
    pub resync_startup_delay: Duration,
    pub resync_parallelism: usize,
    pub unresolved_batch: usize,
    pub snapshot_every: u64,
    pub resolver_pool_size: usize,
    /// Artifacts whose checkouts a resolver keeps on disk.
    pub max_cached_artifacts: usize,
    pub mailbox_capacity: usize,
}

impl EngineConfig {
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        let state_dir = state_dir.into();
        Self {
            scratch_dir: state_dir.join("checkouts"),
            state_dir,
            clone_timeout: Duration::from_secs(20 * 60),
            resolve_timeout: Duration::from_secs(10 * 60),
            query_timeout: Duration::from_secs(20),
            resync_interval: Duration::from_secs(60),
            resync_startup_delay: Duration::from_secs(30),
            resync_parallelism: 4,
            unresolved_batch: UNRESOLVED_BATCH,
            snapshot_every: DEFAULT_SNAPSHOT_EVERY,
            resolver_pool_size: 4,
            max_cached_artifacts: 8,
            mailbox_capacity: 256,
        }
    }

    prov_core::setters! {
        into {
            scratch_dir: PathBuf,
        }
        set {
            clone_timeout: Duration,
            resolve_timeout: Duration,
            query_timeout: Duration,
            resync_interval: Duration,
            resync_startup_delay: Duration,
            resync_parallelism: usize,
            unresolved_batch: usize,
            snapshot_every: u64,
            resolver_pool_size: usize,
            max_cached_artifacts: usize,
            mailbox_capacity: usize,
        }
    }

    pub fn outbox_path(&self) -> PathBuf {
        self.state_dir.join("outbox.jsonl")
    }
}
