// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Commit resolution orchestrator.
//!
//! A resolver serves one request at a time and moves through
//! `Idle -> AwaitingClone -> AwaitingResolution -> Idle`. Requests that
//! arrive while it is busy wait in an explicit queue. Cloning and
//! extraction run as background tasks that report back over an
//! incarnation-local channel, tagged with the request id so that a late
//! report for an abandoned request is ignored.

mod cache;
mod tasks;

use crate::cloner::{ClonerHandle, CloneResult};
use crate::error::EngineError;
use crate::extractor::CommitExtractor;
use crate::registrar::CommitRegistrar;
use crate::state::ArtifactStateRouter;
use crate::supervisor::Mailbox;
use cache::CheckoutCache;
use prov_adapters::{GitAdapter, PublishAdapter};
use prov_core::{ArtifactCoordinates, CommitDetails, CommitSha, RepoUrl, ResolveRequestId};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// One commit to resolve for one artifact version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveCommit {
    pub coordinates: ArtifactCoordinates,
    pub version: String,
    pub sha: CommitSha,
    /// Repositories to search in addition to those already registered.
    #[serde(default)]
    pub candidates: Vec<RepoUrl>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved { repository: RepoUrl, details: Box<CommitDetails> },
    /// `tried` lists the repositories that were actually searched; it is
    /// empty when nothing could be checked out.
    NotFound { tried: Vec<RepoUrl> },
}

pub struct ResolveRequest {
    id: ResolveRequestId,
    job: ResolveCommit,
    reply: Option<oneshot::Sender<Resolution>>,
}

impl ResolveRequest {
    pub(crate) fn finish(self, resolution: Resolution) {
        if let Some(reply) = self.reply {
            let _ = reply.send(resolution);
        }
    }
}

/// Sending side of one resolver's mailbox.
#[derive(Clone)]
pub struct ResolverHandle {
    tx: mpsc::Sender<ResolveRequest>,
}

impl ResolverHandle {
    pub fn new(tx: mpsc::Sender<ResolveRequest>) -> Self {
        Self { tx }
    }

    /// Resolve `job` and wait for the outcome. The outcome has already been
    /// recorded when this returns.
    pub async fn resolve(&self, job: ResolveCommit) -> Result<Resolution, EngineError> {
        let (reply, rx) = oneshot::channel();
        self.send(job, Some(reply)).await?;
        rx.await.map_err(|_| EngineError::Unavailable("commit resolver"))
    }

    /// Queue `job` without waiting for its outcome.
    pub async fn submit(&self, job: ResolveCommit) -> Result<(), EngineError> {
        self.send(job, None).await
    }

    async fn send(
        &self,
        job: ResolveCommit,
        reply: Option<oneshot::Sender<Resolution>>,
    ) -> Result<(), EngineError> {
        let request = ResolveRequest { id: ResolveRequestId::new(), job, reply };
        self.tx.send(request).await.map_err(|_| EngineError::Unavailable("commit resolver"))
    }
}

enum Phase {
    Idle,
    AwaitingClone(ResolveRequest),
    AwaitingResolution(ResolveRequest),
}

impl Phase {
    fn request_id(&self) -> Option<&ResolveRequestId> {
        match self {
            Phase::Idle => None,
            Phase::AwaitingClone(r) | Phase::AwaitingResolution(r) => Some(&r.id),
        }
    }
}

/// Reports from background tasks.
enum Internal {
    Cloned {
        id: ResolveRequestId,
        /// Known repositories first, in registration order, then new candidates.
        wanted: Vec<RepoUrl>,
        result: Result<Option<CloneResult>, EngineError>,
    },
    Resolved {
        id: ResolveRequestId,
        resolution: Resolution,
    },
}

#[derive(Clone)]
pub struct CommitResolver<G, P> {
    name: String,
    extractor: CommitExtractor<G>,
    cloner: ClonerHandle,
    router: ArtifactStateRouter,
    registrar: CommitRegistrar<P>,
    mailbox: Mailbox<ResolveRequest>,
    clone_timeout: Duration,
    resolve_timeout: Duration,
    max_cached_artifacts: usize,
}

impl<G: GitAdapter, P: PublishAdapter> CommitResolver<G, P> {
    pub fn new(
        name: impl Into<String>,
        git: G,
        cloner: ClonerHandle,
        router: ArtifactStateRouter,
        registrar: CommitRegistrar<P>,
        mailbox: Mailbox<ResolveRequest>,
        config: &crate::EngineConfig,
    ) -> Self {
        Self {
            name: name.into(),
            extractor: CommitExtractor::new(git),
            cloner,
            router,
            registrar,
            mailbox,
            clone_timeout: config.clone_timeout,
            resolve_timeout: config.resolve_timeout,
            max_cached_artifacts: config.max_cached_artifacts.max(1),
        }
    }

    /// Serve requests until cancelled or every sender is gone. Cached
    /// checkouts are deleted on the way out.
    pub async fn run(self, cancel: CancellationToken) -> Result<(), EngineError> {
        let mut rx = self.mailbox.lock().await;
        let (internal_tx, mut internal_rx) = mpsc::unbounded_channel();
        let mut cache = CheckoutCache::new(self.max_cached_artifacts);
        let mut phase = Phase::Idle;
        let mut queue: VecDeque<ResolveRequest> = VecDeque::new();
        debug!(resolver = %self.name, "resolver started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                Some(report) = internal_rx.recv() => {
                    phase = self.on_report(report, phase, &mut cache, &mut queue, &internal_tx).await;
                }
                request = rx.recv() => {
                    let Some(request) = request else { break };
                    debug!(
                        resolver = %self.name,
                        request = %request.id,
                        coords = %request.job.coordinates,
                        version = %request.job.version,
                        "resolution requested"
                    );
                    queue.push_back(request);
                }
            }

            if matches!(phase, Phase::Idle) {
                if let Some(next) = queue.pop_front() {
                    phase = self.start(next, &cache, &internal_tx);
                }
            }
        }

        cache.clear().await;
        debug!(resolver = %self.name, "resolver stopped");
        Ok(())
    }

    /// Begin `request`: look up the artifact's repositories and clone any
    /// that are not cached yet.
    fn start(
        &self,
        request: ResolveRequest,
        cache: &CheckoutCache,
        internal_tx: &mpsc::UnboundedSender<Internal>,
    ) -> Phase {
        tokio::spawn(tasks::prepare(
            request.id.clone(),
            request.job.clone(),
            cache.repositories(&request.job.coordinates),
            self.router.clone(),
            self.cloner.clone(),
            self.clone_timeout,
            internal_tx.clone(),
        ));
        Phase::AwaitingClone(request)
    }

    async fn on_report(
        &self,
        report: Internal,
        phase: Phase,
        cache: &mut CheckoutCache,
        queue: &mut VecDeque<ResolveRequest>,
        internal_tx: &mpsc::UnboundedSender<Internal>,
    ) -> Phase {
        let report_id = match &report {
            Internal::Cloned { id, .. } | Internal::Resolved { id, .. } => id.clone(),
        };
        if phase.request_id() != Some(&report_id) {
            debug!(resolver = %self.name, request = %report_id, "ignoring stale report");
            if let Internal::Cloned { result: Ok(Some(result)), .. } = report {
                for path in result.into_checkouts().into_values() {
                    crate::cloner::remove_checkout(&path).await;
                }
            }
            return phase;
        }

        match (phase, report) {
            (Phase::AwaitingClone(request), Internal::Cloned { wanted, result, .. }) => {
                let coords = request.job.coordinates.clone();
                let result = match result {
                    Ok(result) => result,
                    Err(e) => {
                        warn!(resolver = %self.name, coords = %coords, error = %e, "clone failed");
                        self.fail_artifact(request, queue).await;
                        return Phase::Idle;
                    }
                };
                if let Some(result) = result {
                    for path in cache.insert(&coords, result.into_checkouts()) {
                        crate::cloner::remove_checkout(&path).await;
                    }
                }

                let checkouts = cache.checkouts_for(&coords, &wanted);
                if checkouts.is_empty() {
                    info!(resolver = %self.name, coords = %coords, "no repository could be checked out");
                    self.fail_artifact(request, queue).await;
                    return Phase::Idle;
                }

                tokio::spawn(tasks::extract(
                    request.id.clone(),
                    request.job.clone(),
                    checkouts,
                    self.extractor.clone(),
                    self.registrar.clone(),
                    self.resolve_timeout,
                    internal_tx.clone(),
                ));
                Phase::AwaitingResolution(request)
            }
            (Phase::AwaitingResolution(request), Internal::Resolved { resolution, .. }) => {
                cache.touch(&request.job.coordinates);
                request.finish(resolution);
                Phase::Idle
            }
            (phase, _) => phase,
        }
    }

    /// Report `NotFound` with nothing tried for `request` and every queued
    /// request for the same artifact.
    async fn fail_artifact(&self, request: ResolveRequest, queue: &mut VecDeque<ResolveRequest>) {
        let coords = request.job.coordinates.clone();
        let (same, rest): (VecDeque<_>, VecDeque<_>) =
            queue.drain(..).partition(|r| r.job.coordinates == coords);
        *queue = rest;

        for failed in std::iter::once(request).chain(same) {
            let resolution = Resolution::NotFound { tried: Vec::new() };
            self.registrar.record(&failed.job, &resolution).await;
            failed.finish(resolution);
        }
    }
}

#[cfg(test)]
#[path = "../resolver_tests.rs"]
mod tests;
