// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Background work for one resolution request.

use super::{Internal, Resolution, ResolveCommit};
use crate::cloner::{remove_checkout, ClonerHandle};
use crate::error::EngineError;
use crate::extractor::{CommitExtractor, Extraction};
use crate::registrar::CommitRegistrar;
use crate::state::ArtifactStateRouter;
use indexmap::IndexSet;
use prov_adapters::{GitAdapter, PublishAdapter};
use prov_core::{RepoUrl, ResolveRequestId};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Work out which repositories to search and clone the ones without a
/// checkout.
pub(super) async fn prepare(
    id: ResolveRequestId,
    job: ResolveCommit,
    cached: Vec<RepoUrl>,
    router: ArtifactStateRouter,
    cloner: ClonerHandle,
    clone_timeout: Duration,
    report: mpsc::UnboundedSender<Internal>,
) {
    let known = match router.handle(&job.coordinates) {
        Ok(handle) => handle.repositories().await,
        Err(e) => Err(e),
    };
    let known = known.unwrap_or_else(|e| {
        warn!(request = %id, coords = %job.coordinates, error = %e, "failed to read repositories");
        None
    });

    let wanted: IndexSet<RepoUrl> =
        known.unwrap_or_default().into_iter().chain(job.candidates.iter().cloned()).collect();
    let missing: Vec<RepoUrl> = wanted.iter().filter(|r| !cached.contains(r)).cloned().collect();

    let result = if missing.is_empty() {
        Ok(None)
    } else {
        debug!(
            request = %id,
            coords = %job.coordinates,
            cloning = missing.len(),
            cached = cached.len(),
            "requesting clone"
        );
        match tokio::time::timeout(clone_timeout, cloner.clone_repos(job.coordinates.clone(), missing))
            .await
        {
            Ok(Ok(result)) => Ok(Some(result)),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(EngineError::Timeout("clone")),
        }
    };

    let cloned = Internal::Cloned { id, wanted: wanted.into_iter().collect(), result };
    if let Err(mpsc::error::SendError(Internal::Cloned { result: Ok(Some(result)), .. })) =
        report.send(cloned)
    {
        // the resolver that asked is gone
        for path in result.into_checkouts().into_values() {
            remove_checkout(&path).await;
        }
    }
}

/// Search `checkouts` in order until one holds the commit, record the
/// outcome, and report it.
pub(super) async fn extract<G: GitAdapter, P: PublishAdapter>(
    id: ResolveRequestId,
    job: ResolveCommit,
    checkouts: Vec<(RepoUrl, PathBuf)>,
    extractor: CommitExtractor<G>,
    registrar: CommitRegistrar<P>,
    resolve_timeout: Duration,
    report: mpsc::UnboundedSender<Internal>,
) {
    let mut tried = Vec::with_capacity(checkouts.len());
    let mut resolution = None;

    for (repository, path) in checkouts {
        let found = tokio::time::timeout(resolve_timeout, extractor.resolve(&path, &repository, &job.sha))
            .await
            .unwrap_or_else(|_| {
                warn!(request = %id, repo = %repository, sha = %job.sha, "extraction timed out");
                Extraction::NotFound
            });
        match found {
            Extraction::Found(details) => {
                resolution = Some(Resolution::Resolved { repository, details });
                break;
            }
            Extraction::NotFound => tried.push(repository),
        }
    }

    let resolution = resolution.unwrap_or(Resolution::NotFound { tried });
    match &resolution {
        Resolution::Resolved { repository, .. } => info!(
            request = %id,
            coords = %job.coordinates,
            version = %job.version,
            sha = %job.sha,
            repo = %repository,
            "commit resolved"
        ),
        Resolution::NotFound { tried } => info!(
            request = %id,
            coords = %job.coordinates,
            version = %job.version,
            sha = %job.sha,
            tried = tried.len(),
            "commit not found"
        ),
    }

    registrar.record(&job, &resolution).await;
    let _ = report.send(Internal::Resolved { id, resolution });
}
