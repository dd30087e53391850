// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Records resolution outcomes in artifact state and publishes them.

use crate::resolver::{Resolution, ResolveCommit};
use crate::state::ArtifactStateRouter;
use prov_adapters::{Publication, PublishAdapter};
use tracing::{info, warn};

#[derive(Clone)]
pub struct CommitRegistrar<P> {
    router: ArtifactStateRouter,
    publisher: P,
}

impl<P: PublishAdapter> CommitRegistrar<P> {
    pub fn new(router: ArtifactStateRouter, publisher: P) -> Self {
        Self { router, publisher }
    }

    /// Apply `resolution` to the artifact and publish it when it changed
    /// anything.
    ///
    /// A miss is only recorded once every repository registered for the
    /// artifact has been searched. Otherwise the version stays pending and
    /// the next resync cycle tries again.
    pub async fn record(&self, job: &ResolveCommit, resolution: &Resolution) {
        let coords = &job.coordinates;
        let handle = match self.router.handle(coords) {
            Ok(handle) => handle,
            Err(e) => {
                warn!(coords = %coords, version = %job.version, error = %e, "cannot record resolution");
                return;
            }
        };

        let publication = match resolution {
            Resolution::Resolved { repository, details } => {
                match handle.mark_resolved(&job.version, repository.clone(), (**details).clone()).await {
                    Ok(true) => Publication::CommitResolved {
                        coordinates: coords.clone(),
                        version: job.version.clone(),
                        repository: repository.clone(),
                        details: details.clone(),
                    },
                    Ok(false) => return,
                    Err(e) => {
                        warn!(coords = %coords, version = %job.version, error = %e, "failed to mark resolved");
                        return;
                    }
                }
            }
            Resolution::NotFound { tried } => {
                let known = match handle.repositories().await {
                    Ok(known) => known.unwrap_or_default(),
                    Err(e) => {
                        warn!(coords = %coords, version = %job.version, error = %e, "failed to read repositories");
                        return;
                    }
                };
                let exhausted = !tried.is_empty() && known.iter().all(|r| tried.contains(r));
                if !exhausted {
                    info!(
                        coords = %coords,
                        version = %job.version,
                        sha = %job.sha,
                        tried = tried.len(),
                        known = known.len(),
                        "commit not found yet, will retry"
                    );
                    return;
                }
                match handle.mark_missing(&job.version, job.sha.clone()).await {
                    Ok(true) => Publication::CommitUnresolvable {
                        coordinates: coords.clone(),
                        version: job.version.clone(),
                        repository: tried.last().cloned(),
                        sha: job.sha.clone(),
                    },
                    Ok(false) => return,
                    Err(e) => {
                        warn!(coords = %coords, version = %job.version, error = %e, "failed to mark missing");
                        return;
                    }
                }
            }
        };

        if let Err(e) = self.publisher.publish(publication).await {
            warn!(coords = %coords, version = %job.version, error = %e, "failed to publish outcome");
        }
    }
}

#[cfg(test)]
#[path = "registrar_tests.rs"]
mod tests;
