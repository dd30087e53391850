// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Periodic resync of every tracked artifact's unresolved work.

use crate::error::EngineError;
use crate::pool::ResolverPool;
use crate::resolver::{Resolution, ResolveCommit};
use crate::state::ArtifactStateRouter;
use crate::supervisor::Mailbox;
use crate::EngineConfig;
use futures_util::stream::{self, StreamExt};
use prov_core::ArtifactCoordinates;
use std::collections::BTreeSet;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Registers artifacts for resync.
#[derive(Clone)]
pub struct SchedulerHandle {
    tx: mpsc::Sender<ArtifactCoordinates>,
}

impl SchedulerHandle {
    pub fn new(tx: mpsc::Sender<ArtifactCoordinates>) -> Self {
        Self { tx }
    }

    /// Track `coords` from the next cycle on.
    pub async fn track(&self, coords: ArtifactCoordinates) -> Result<(), EngineError> {
        self.tx.send(coords).await.map_err(|_| EngineError::Unavailable("resync scheduler"))
    }
}

/// Totals for one resync cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub artifacts: usize,
    pub requests: usize,
    pub resolved: usize,
    pub not_found: usize,
    pub failed: usize,
}

#[derive(Clone)]
pub struct ResyncScheduler {
    router: ArtifactStateRouter,
    pool: ResolverPool,
    registrations: Mailbox<ArtifactCoordinates>,
    interval: Duration,
    startup_delay: Duration,
    parallelism: usize,
    /// Bound on one request: a clone session followed by the extraction.
    request_timeout: Duration,
}

impl ResyncScheduler {
    pub fn new(
        router: ArtifactStateRouter,
        pool: ResolverPool,
        registrations: Mailbox<ArtifactCoordinates>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            router,
            pool,
            registrations,
            interval: config.resync_interval,
            startup_delay: config.resync_startup_delay,
            parallelism: config.resync_parallelism.max(1),
            request_timeout: config.clone_timeout.saturating_add(config.resolve_timeout),
        }
    }

    /// Wait out the startup delay, then run a cycle, sleep for the interval,
    /// and repeat until cancelled. Every stored partition is tracked from
    /// the start.
    pub async fn run(self, cancel: CancellationToken) -> Result<(), EngineError> {
        let mut registrations = self.registrations.lock().await;
        let mut tracked: BTreeSet<ArtifactCoordinates> = BTreeSet::new();
        match self.router.known_artifacts() {
            Ok(known) => tracked.extend(known),
            Err(e) => warn!(error = %e, "failed to list stored artifacts"),
        }
        info!(tracked = tracked.len(), delay_ms = self.startup_delay.as_millis() as u64, "resync scheduler started");

        // received at any time, tracked from the next cycle start
        let mut deferred: BTreeSet<ArtifactCoordinates> = BTreeSet::new();
        let mut delay = self.startup_delay;
        loop {
            let sleep = tokio::time::sleep(delay);
            tokio::pin!(sleep);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => return Ok(()),
                    _ = &mut sleep => break,
                    Some(coords) = registrations.recv() => {
                        deferred.insert(coords);
                    }
                }
            }
            delay = self.interval;
            tracked.append(&mut deferred);

            let report = {
                let cycle = self.run_cycle(&tracked);
                tokio::pin!(cycle);
                loop {
                    tokio::select! {
                        _ = cancel.cancelled() => return Ok(()),
                        report = &mut cycle => break report,
                        Some(coords) = registrations.recv() => {
                            deferred.insert(coords);
                        }
                    }
                }
            };
            if report.requests > 0 {
                info!(
                    artifacts = report.artifacts,
                    requests = report.requests,
                    resolved = report.resolved,
                    not_found = report.not_found,
                    failed = report.failed,
                    "resync cycle finished"
                );
            } else {
                debug!(artifacts = report.artifacts, "resync cycle found no work");
            }
        }
    }

    /// Collect the unresolved work of `tracked` and push it through the pool,
    /// `parallelism` requests at a time. Returns once every request has an
    /// outcome.
    pub async fn run_cycle(&self, tracked: &BTreeSet<ArtifactCoordinates>) -> CycleReport {
        let mut report = CycleReport { artifacts: tracked.len(), ..CycleReport::default() };
        let mut jobs = Vec::new();

        for coords in tracked {
            let work = match self.router.handle(coords) {
                Ok(handle) => handle.unresolved_work().await,
                Err(e) => Err(e),
            };
            match work {
                Ok(work) => jobs.extend(work.commits.into_iter().map(|commit| ResolveCommit {
                    coordinates: coords.clone(),
                    version: commit.version,
                    sha: commit.sha,
                    candidates: work.repositories.clone(),
                })),
                Err(e) => warn!(coords = %coords, error = %e, "failed to read unresolved work"),
            }
        }
        report.requests = jobs.len();

        let outcomes: Vec<Result<Resolution, EngineError>> = stream::iter(jobs)
            .map(|job| {
                let pool = self.pool.clone();
                let timeout = self.request_timeout;
                async move {
                    let coords = job.coordinates.clone();
                    let outcome = tokio::time::timeout(timeout, pool.resolve(job))
                        .await
                        .unwrap_or(Err(EngineError::Timeout("resolution")));
                    if let Err(e) = &outcome {
                        warn!(coords = %coords, error = %e, "resolution failed");
                    }
                    outcome
                }
            })
            .buffer_unordered(self.parallelism)
            .collect()
            .await;

        for outcome in outcomes {
            match outcome {
                Ok(Resolution::Resolved { .. }) => report.resolved += 1,
                Ok(Resolution::NotFound { .. }) => report.not_found += 1,
                Err(_) => report.failed += 1,
            }
        }
        report
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
