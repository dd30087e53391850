// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Upstream facts and their translation into artifact commands.

use crate::error::EngineError;
use crate::pool::ResolverPool;
use crate::resolver::ResolveCommit;
use crate::scheduler::SchedulerHandle;
use crate::state::{ArtifactHandle, ArtifactStateRouter};
use prov_core::{ArtifactCoordinates, CommitDetails, CommitSha, RepoUrl};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// A fact reported by an upstream collaborator.
///
/// Repository urls and shas stay raw here so that invalid values are
/// rejected with a reason instead of failing to parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum UpstreamFact {
    ArtifactRegistered {
        coordinates: ArtifactCoordinates,
    },
    RepositoryAssociated {
        coordinates: ArtifactCoordinates,
        repository: String,
    },
    VersionRegistered {
        coordinates: ArtifactCoordinates,
        version: String,
    },
    /// A sha read from a built asset's manifest.
    CommitExtracted {
        coordinates: ArtifactCoordinates,
        version: String,
        sha: String,
    },
    CommitDetailsAssociated {
        coordinates: ArtifactCoordinates,
        version: String,
        repository: String,
        details: Box<CommitDetails>,
    },
    ResolutionRequested {
        coordinates: ArtifactCoordinates,
        version: String,
        sha: String,
        #[serde(default)]
        repositories: Vec<String>,
    },
    #[serde(other)]
    Unknown,
}

impl UpstreamFact {
    pub fn coordinates(&self) -> Option<&ArtifactCoordinates> {
        match self {
            UpstreamFact::ArtifactRegistered { coordinates }
            | UpstreamFact::RepositoryAssociated { coordinates, .. }
            | UpstreamFact::VersionRegistered { coordinates, .. }
            | UpstreamFact::CommitExtracted { coordinates, .. }
            | UpstreamFact::CommitDetailsAssociated { coordinates, .. }
            | UpstreamFact::ResolutionRequested { coordinates, .. } => Some(coordinates),
            UpstreamFact::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The fact changed state or started work.
    Applied,
    /// Already known, or not understood.
    NoOp,
    Rejected(String),
}

#[derive(Clone)]
pub struct IngestConsumer {
    router: ArtifactStateRouter,
    pool: ResolverPool,
    scheduler: SchedulerHandle,
}

impl IngestConsumer {
    pub fn new(router: ArtifactStateRouter, pool: ResolverPool, scheduler: SchedulerHandle) -> Self {
        Self { router, pool, scheduler }
    }

    /// Ingest a fact of unknown shape. Anything that is not a recognizable
    /// fact is logged and acknowledged as a no-op.
    pub async fn ingest_value(&self, value: serde_json::Value) -> Result<IngestOutcome, EngineError> {
        match serde_json::from_value::<UpstreamFact>(value) {
            Ok(fact) => self.ingest(fact).await,
            Err(e) => {
                warn!(error = %e, "ignoring malformed upstream fact");
                Ok(IngestOutcome::NoOp)
            }
        }
    }

    pub async fn ingest(&self, fact: UpstreamFact) -> Result<IngestOutcome, EngineError> {
        let Some(coords) = fact.coordinates().cloned() else {
            warn!("ignoring upstream fact of unknown type");
            return Ok(IngestOutcome::NoOp);
        };
        let handle = self.router.handle(&coords)?;

        let outcome = match fact {
            UpstreamFact::ArtifactRegistered { .. } => changed(handle.register_artifact().await?),
            UpstreamFact::RepositoryAssociated { repository, .. } => {
                let repository = match RepoUrl::parse(&repository) {
                    Ok(url) => url,
                    Err(e) => return Ok(reject(&coords, e)),
                };
                let added = handle.register_repository(repository).await?;
                if added {
                    self.resolve_pending(handle);
                }
                changed(added)
            }
            UpstreamFact::VersionRegistered { version, .. } => {
                changed(handle.register_version(version).await?)
            }
            UpstreamFact::CommitExtracted { version, sha, .. } => {
                let sha = match CommitSha::parse(&sha) {
                    Ok(sha) => sha,
                    Err(e) => return Ok(reject(&coords, e)),
                };
                changed(handle.register_raw_commit(version, sha).await?)
            }
            UpstreamFact::CommitDetailsAssociated { version, repository, details, .. } => {
                let repository = match RepoUrl::parse(&repository) {
                    Ok(url) => url,
                    Err(e) => return Ok(reject(&coords, e)),
                };
                changed(handle.mark_resolved(version, repository, *details).await?)
            }
            UpstreamFact::ResolutionRequested { version, sha, repositories, .. } => {
                let sha = match CommitSha::parse(&sha) {
                    Ok(sha) => sha,
                    Err(e) => return Ok(reject(&coords, e)),
                };
                let candidates = match repositories
                    .iter()
                    .map(|r| RepoUrl::parse(r))
                    .collect::<Result<Vec<_>, _>>()
                {
                    Ok(candidates) => candidates,
                    Err(e) => return Ok(reject(&coords, e)),
                };
                self.pool
                    .submit(ResolveCommit { coordinates: coords.clone(), version, sha, candidates })
                    .await?;
                IngestOutcome::Applied
            }
            UpstreamFact::Unknown => IngestOutcome::NoOp,
        };

        if outcome == IngestOutcome::Applied {
            self.scheduler.track(coords.clone()).await?;
        }
        debug!(coords = %coords, outcome = ?outcome, "ingested upstream fact");
        Ok(outcome)
    }

    /// Queue the artifact's unresolved work without waiting for it.
    fn resolve_pending(&self, handle: ArtifactHandle) {
        let pool = self.pool.clone();
        tokio::spawn(async move {
            let coords = handle.coordinates().clone();
            let work = match handle.unresolved_work().await {
                Ok(work) => work,
                Err(e) => {
                    warn!(coords = %coords, error = %e, "failed to read unresolved work");
                    return;
                }
            };
            if work.is_empty() {
                return;
            }
            info!(coords = %coords, versions = work.commits.len(), "resolving after new repository");
            for commit in work.commits {
                let job = ResolveCommit {
                    coordinates: coords.clone(),
                    version: commit.version,
                    sha: commit.sha,
                    candidates: work.repositories.clone(),
                };
                if let Err(e) = pool.submit(job).await {
                    warn!(coords = %coords, error = %e, "failed to queue resolution");
                    return;
                }
            }
        });
    }
}

fn changed(changed: bool) -> IngestOutcome {
    if changed {
        IngestOutcome::Applied
    } else {
        IngestOutcome::NoOp
    }
}

fn reject(coords: &ArtifactCoordinates, reason: impl std::fmt::Display) -> IngestOutcome {
    warn!(coords = %coords, reason = %reason, "rejected upstream fact");
    IngestOutcome::Rejected(reason.to_string())
}

#[cfg(test)]
#[path = "ingest_tests.rs"]
mod tests;
