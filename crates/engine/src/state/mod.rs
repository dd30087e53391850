// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-artifact git state, one owner task per artifact.
//!
//! [`ArtifactStateRouter`] is the routing directory: it maps coordinates to
//! the [`ArtifactHandle`] of the task that owns that artifact's partition,
//! spawning the owner on first use. Every command for one artifact goes
//! through the same owner, so mutations are linearized per artifact while
//! unrelated artifacts proceed in parallel.

mod owner;

use crate::config::EngineConfig;
use crate::error::EngineError;
use owner::{Command, Reply};
use parking_lot::Mutex;
use prov_core::{ArtifactCoordinates, CommitDetails, CommitSha, CommitStatus, RepoUrl};
use prov_storage::{ArtifactGitState, PartitionStore, UnresolvedWork};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

/// Routes commands to the single owner of each artifact.
#[derive(Clone)]
pub struct ArtifactStateRouter {
    store: Arc<PartitionStore>,
    owners: Arc<Mutex<HashMap<ArtifactCoordinates, ArtifactHandle>>>,
    mailbox_capacity: usize,
    batch_cap: usize,
    query_timeout: Duration,
    cancel: CancellationToken,
}

impl ArtifactStateRouter {
    pub fn new(store: Arc<PartitionStore>, config: &EngineConfig, cancel: CancellationToken) -> Self {
        Self {
            store,
            owners: Arc::new(Mutex::new(HashMap::new())),
            mailbox_capacity: config.mailbox_capacity,
            batch_cap: config.unresolved_batch,
            query_timeout: config.query_timeout,
            cancel,
        }
    }

    /// Handle to the owner of `coords`, recovering its partition if no owner
    /// is running.
    pub fn handle(&self, coords: &ArtifactCoordinates) -> Result<ArtifactHandle, EngineError> {
        if self.cancel.is_cancelled() {
            return Err(EngineError::Unavailable("artifact state"));
        }
        let mut owners = self.owners.lock();
        if let Some(handle) = owners.get(coords) {
            if !handle.tx.is_closed() {
                return Ok(handle.clone());
            }
        }

        let partition = self.store.open(coords)?;
        let (tx, rx) = mpsc::channel(self.mailbox_capacity.max(1));
        tokio::spawn(owner::run_owner(partition, rx, self.batch_cap, self.cancel.child_token()));

        let handle = ArtifactHandle {
            coordinates: coords.clone(),
            tx,
            query_timeout: self.query_timeout,
        };
        owners.insert(coords.clone(), handle.clone());
        Ok(handle)
    }

    /// Every artifact with a stored partition.
    pub fn known_artifacts(&self) -> Result<Vec<ArtifactCoordinates>, EngineError> {
        Ok(self.store.known_partitions()?)
    }

    /// Number of owners currently running.
    pub fn active_owners(&self) -> usize {
        self.owners.lock().values().filter(|h| !h.tx.is_closed()).count()
    }
}

/// Async facade over one artifact owner's mailbox.
///
/// Mutating methods return `true` when the command changed the state and
/// `false` when it was a no-op.
#[derive(Clone)]
pub struct ArtifactHandle {
    coordinates: ArtifactCoordinates,
    tx: mpsc::Sender<Command>,
    query_timeout: Duration,
}

impl ArtifactHandle {
    pub fn coordinates(&self) -> &ArtifactCoordinates {
        &self.coordinates
    }

    pub async fn register_artifact(&self) -> Result<bool, EngineError> {
        self.request(|reply| Command::RegisterArtifact { reply }).await
    }

    pub async fn register_repository(&self, repository: RepoUrl) -> Result<bool, EngineError> {
        self.request(|reply| Command::RegisterRepository { repository, reply }).await
    }

    pub async fn register_version(&self, version: impl Into<String>) -> Result<bool, EngineError> {
        let version = version.into();
        self.request(|reply| Command::RegisterVersion { version, reply }).await
    }

    pub async fn register_raw_commit(
        &self,
        version: impl Into<String>,
        sha: CommitSha,
    ) -> Result<bool, EngineError> {
        let version = version.into();
        self.request(|reply| Command::RegisterRawCommit { version, sha, reply }).await
    }

    pub async fn mark_resolved(
        &self,
        version: impl Into<String>,
        repository: RepoUrl,
        details: CommitDetails,
    ) -> Result<bool, EngineError> {
        let version = version.into();
        let details = Box::new(details);
        self.request(|reply| Command::MarkResolved { version, repository, details, reply }).await
    }

    /// Record that `sha` was not found in any known repository. Ignored
    /// unless `version` is still pending with that same sha.
    pub async fn mark_missing(
        &self,
        version: impl Into<String>,
        sha: CommitSha,
    ) -> Result<bool, EngineError> {
        let version = version.into();
        self.request(|reply| Command::MarkMissing { version, sha, reply }).await
    }

    /// Registered repositories in registration order; `None` when there are
    /// none yet.
    pub async fn repositories(&self) -> Result<Option<Vec<RepoUrl>>, EngineError> {
        self.request(|reply| Command::GetRepositories { reply }).await
    }

    pub async fn unresolved_work(&self) -> Result<UnresolvedWork, EngineError> {
        self.request(|reply| Command::GetUnresolvedWork { reply }).await
    }

    pub async fn status(&self, version: impl Into<String>) -> Result<Option<CommitStatus>, EngineError> {
        let version = version.into();
        self.request(|reply| Command::GetStatus { version, reply }).await
    }

    pub async fn state(&self) -> Result<ArtifactGitState, EngineError> {
        self.request(|reply| Command::GetState { reply }).await
    }

    async fn request<T>(&self, make: impl FnOnce(Reply<T>) -> Command) -> Result<T, EngineError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let exchange = async {
            self.tx
                .send(make(reply_tx))
                .await
                .map_err(|_| EngineError::Unavailable("artifact owner"))?;
            reply_rx.await.map_err(|_| EngineError::Unavailable("artifact owner"))?
        };
        tokio::time::timeout(self.query_timeout, exchange)
            .await
            .map_err(|_| EngineError::Timeout("artifact state query"))?
    }
}

#[cfg(test)]
#[path = "../state_tests.rs"]
mod tests;
