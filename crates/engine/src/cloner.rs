// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Repository cloner: one clone session at a time, requests in arrival order.
//!
//! Every session clones from scratch into fresh, uniquely named directories.
//! The URLs of a session are cloned in parallel and a failure of one does not
//! abort the others. A request for the same artifact and URL set as the
//! active or a queued session joins that session instead of cloning again.

use crate::error::EngineError;
use crate::supervisor::Mailbox;
use futures_util::future::join_all;
use indexmap::{IndexMap, IndexSet};
use prov_adapters::GitAdapter;
use prov_core::{ArtifactCoordinates, CloneSessionId, RepoUrl};
use std::collections::{BTreeSet, VecDeque};
use std::path::{Path, PathBuf};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Outcome of one clone session. Total failure is a `PartialSuccess` with
/// no checkouts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloneResult {
    FullSuccess(IndexMap<RepoUrl, PathBuf>),
    PartialSuccess(IndexMap<RepoUrl, PathBuf>),
}

impl CloneResult {
    pub fn checkouts(&self) -> &IndexMap<RepoUrl, PathBuf> {
        match self {
            CloneResult::FullSuccess(map) | CloneResult::PartialSuccess(map) => map,
        }
    }

    pub fn into_checkouts(self) -> IndexMap<RepoUrl, PathBuf> {
        match self {
            CloneResult::FullSuccess(map) | CloneResult::PartialSuccess(map) => map,
        }
    }

    pub fn is_full(&self) -> bool {
        matches!(self, CloneResult::FullSuccess(_))
    }
}

pub struct CloneRequest {
    pub coordinates: ArtifactCoordinates,
    pub repositories: Vec<RepoUrl>,
    pub reply: oneshot::Sender<CloneResult>,
}

/// Sending side of the cloner's mailbox.
#[derive(Clone)]
pub struct ClonerHandle {
    tx: mpsc::Sender<CloneRequest>,
}

impl ClonerHandle {
    pub fn new(tx: mpsc::Sender<CloneRequest>) -> Self {
        Self { tx }
    }

    /// Clone `repositories` for `coords`. Callers bound the wait themselves.
    pub async fn clone_repos(
        &self,
        coordinates: ArtifactCoordinates,
        repositories: Vec<RepoUrl>,
    ) -> Result<CloneResult, EngineError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(CloneRequest { coordinates, repositories, reply })
            .await
            .map_err(|_| EngineError::Unavailable("repository cloner"))?;
        rx.await.map_err(|_| EngineError::Unavailable("repository cloner"))
    }
}

type SessionKey = (ArtifactCoordinates, BTreeSet<RepoUrl>);

struct Session {
    id: CloneSessionId,
    key: SessionKey,
    coordinates: ArtifactCoordinates,
    repositories: Vec<RepoUrl>,
    waiters: Vec<oneshot::Sender<CloneResult>>,
}

impl Session {
    fn new(request: CloneRequest) -> Self {
        let repositories: Vec<RepoUrl> =
            request.repositories.into_iter().collect::<IndexSet<_>>().into_iter().collect();
        let key = (request.coordinates.clone(), repositories.iter().cloned().collect());
        Self {
            id: CloneSessionId::new(),
            key,
            coordinates: request.coordinates,
            repositories,
            waiters: vec![request.reply],
        }
    }

    /// Hand `result` to every waiter still listening. Returns it back when
    /// none was.
    fn finish(self, result: CloneResult) -> Option<CloneResult> {
        let mut delivered = false;
        for waiter in self.waiters {
            delivered |= waiter.send(result.clone()).is_ok();
        }
        (!delivered).then_some(result)
    }
}

#[derive(Clone)]
pub struct RepositoryCloner<G> {
    git: G,
    scratch_dir: PathBuf,
    mailbox: Mailbox<CloneRequest>,
}

impl<G: GitAdapter> RepositoryCloner<G> {
    pub fn new(git: G, scratch_dir: impl Into<PathBuf>, mailbox: Mailbox<CloneRequest>) -> Self {
        Self { git, scratch_dir: scratch_dir.into(), mailbox }
    }

    /// Serve clone requests until cancelled or every sender is gone.
    pub async fn run(self, cancel: CancellationToken) -> Result<(), EngineError> {
        tokio::fs::create_dir_all(&self.scratch_dir).await?;
        let mut rx = self.mailbox.lock().await;

        let mut active: Option<Session> = None;
        let mut queue: VecDeque<Session> = VecDeque::new();
        let mut tasks: JoinSet<CloneResult> = JoinSet::new();

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                Some(joined) = tasks.join_next(), if active.is_some() => {
                    let result = joined.unwrap_or_else(|e| {
                        warn!(error = %e, "clone session task failed");
                        CloneResult::PartialSuccess(IndexMap::new())
                    });
                    if let Some(session) = active.take() {
                        info!(
                            session = %session.id,
                            coords = %session.coordinates,
                            cloned = result.checkouts().len(),
                            requested = session.repositories.len(),
                            waiters = session.waiters.len(),
                            "clone session finished"
                        );
                        let id = session.id.clone();
                        if let Some(unclaimed) = session.finish(result) {
                            debug!(
                                session = %id,
                                checkouts = unclaimed.checkouts().len(),
                                "removing unclaimed checkouts"
                            );
                            for path in unclaimed.into_checkouts().into_values() {
                                remove_checkout(&path).await;
                            }
                        }
                    }
                }
                request = rx.recv() => {
                    let Some(request) = request else { break };
                    let session = Session::new(request);
                    if let Some(existing) = active
                        .iter_mut()
                        .chain(queue.iter_mut())
                        .find(|s| s.key == session.key)
                    {
                        debug!(session = %existing.id, coords = %existing.coordinates, "joined existing clone session");
                        existing.waiters.extend(session.waiters);
                        continue;
                    }
                    queue.push_back(session);
                }
            }

            if active.is_none() {
                if let Some(session) = queue.pop_front() {
                    info!(
                        session = %session.id,
                        coords = %session.coordinates,
                        repos = session.repositories.len(),
                        queued = queue.len(),
                        "clone session started"
                    );
                    tasks.spawn(clone_all(
                        self.git.clone(),
                        self.scratch_dir.clone(),
                        session.id.clone(),
                        session.coordinates.clone(),
                        session.repositories.clone(),
                    ));
                    active = Some(session);
                }
            }
        }
        Ok(())
    }
}

async fn clone_all<G: GitAdapter>(
    git: G,
    scratch_dir: PathBuf,
    id: CloneSessionId,
    coordinates: ArtifactCoordinates,
    repositories: Vec<RepoUrl>,
) -> CloneResult {
    let attempts = repositories.iter().map(|url| {
        let dest = checkout_dir(&scratch_dir, &coordinates);
        clone_one(&git, &id, url, dest)
    });
    let outcomes = join_all(attempts).await;

    let total = repositories.len();
    let checkouts: IndexMap<RepoUrl, PathBuf> = repositories
        .into_iter()
        .zip(outcomes)
        .filter_map(|(url, dest)| dest.map(|dest| (url, dest)))
        .collect();
    if checkouts.len() == total {
        CloneResult::FullSuccess(checkouts)
    } else {
        CloneResult::PartialSuccess(checkouts)
    }
}

async fn clone_one<G: GitAdapter>(
    git: &G,
    id: &CloneSessionId,
    url: &RepoUrl,
    dest: PathBuf,
) -> Option<PathBuf> {
    match git.clone_repo(url, &dest).await {
        Ok(()) => {
            debug!(session = %id, repo = %url, path = %dest.display(), "cloned repository");
            Some(dest)
        }
        Err(e) => {
            warn!(session = %id, repo = %url, error = %e, "clone failed");
            remove_checkout(&dest).await;
            None
        }
    }
}

/// `{scratch}/prov-{artifactId}-{uuid}`, with the artifact id reduced to
/// path-safe characters.
pub(crate) fn checkout_dir(scratch_dir: &Path, coordinates: &ArtifactCoordinates) -> PathBuf {
    let name: String = coordinates
        .artifact_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    scratch_dir.join(format!("prov-{name}-{}", uuid::Uuid::new_v4()))
}

/// Best-effort removal of a checkout directory.
pub(crate) async fn remove_checkout(path: &Path) {
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "failed to remove checkout"),
    }
}

#[cfg(test)]
#[path = "cloner_tests.rs"]
mod tests;
