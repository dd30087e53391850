// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! prov-engine: workers that resolve raw commit shas into commit metadata

mod config;
mod error;

pub mod cloner;
pub mod extractor;
pub mod ingest;
pub mod pool;
pub mod registrar;
pub mod resolver;
pub mod scheduler;
pub mod state;
pub mod supervisor;

#[cfg(test)]
mod test_helpers;

pub use cloner::{CloneResult, ClonerHandle, RepositoryCloner};
pub use config::EngineConfig;
pub use error::EngineError;
pub use extractor::{CommitExtractor, Extraction};
pub use ingest::{IngestConsumer, IngestOutcome, UpstreamFact};
pub use pool::ResolverPool;
pub use registrar::CommitRegistrar;
pub use resolver::{CommitResolver, Resolution, ResolveCommit, ResolverHandle};
pub use scheduler::{CycleReport, ResyncScheduler, SchedulerHandle};
pub use state::{ArtifactHandle, ArtifactStateRouter};
pub use supervisor::{mailbox, supervise, BackoffPolicy, Mailbox};

use prov_adapters::{GitAdapter, PublishAdapter};
use prov_storage::PartitionStore;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// The assembled pipeline: artifact state, a supervised cloner, a pool of
/// supervised resolvers, and the supervised resync scheduler.
pub struct Engine {
    router: ArtifactStateRouter,
    pool: ResolverPool,
    scheduler: SchedulerHandle,
    ingest: IngestConsumer,
    cancel: CancellationToken,
    workers: Vec<JoinHandle<()>>,
}

impl Engine {
    /// Spawn every worker. Must be called inside a tokio runtime.
    pub fn start<G: GitAdapter, P: PublishAdapter>(
        config: EngineConfig,
        git: G,
        publisher: P,
        cancel: CancellationToken,
    ) -> Self {
        let policy = BackoffPolicy::default();
        let store = Arc::new(PartitionStore::new(&config.state_dir, config.snapshot_every));
        let router = ArtifactStateRouter::new(store, &config, cancel.child_token());
        let registrar = CommitRegistrar::new(router.clone(), publisher);
        let mut workers = Vec::new();

        let (cloner_tx, cloner_mailbox) = mailbox(config.mailbox_capacity);
        let cloner = RepositoryCloner::new(git.clone(), &config.scratch_dir, cloner_mailbox);
        let worker_cancel = cancel.clone();
        workers.push(supervise("cloner", policy, cancel.clone(), move || {
            cloner.clone().run(worker_cancel.clone())
        }));
        let cloner = ClonerHandle::new(cloner_tx);

        let mut resolvers = Vec::with_capacity(config.resolver_pool_size.max(1));
        for index in 0..config.resolver_pool_size.max(1) {
            let (tx, resolver_mailbox) = mailbox(config.mailbox_capacity);
            let resolver = CommitResolver::new(
                format!("resolver-{index}"),
                git.clone(),
                cloner.clone(),
                router.clone(),
                registrar.clone(),
                resolver_mailbox,
                &config,
            );
            let worker_cancel = cancel.clone();
            workers.push(supervise("resolver", policy, cancel.clone(), move || {
                resolver.clone().run(worker_cancel.clone())
            }));
            resolvers.push(ResolverHandle::new(tx));
        }
        let pool = ResolverPool::new(resolvers);

        let (scheduler_tx, registrations) = mailbox(config.mailbox_capacity);
        let scheduler = ResyncScheduler::new(router.clone(), pool.clone(), registrations, &config);
        let worker_cancel = cancel.clone();
        workers.push(supervise("scheduler", policy, cancel.clone(), move || {
            scheduler.clone().run(worker_cancel.clone())
        }));
        let scheduler = SchedulerHandle::new(scheduler_tx);

        let ingest = IngestConsumer::new(router.clone(), pool.clone(), scheduler.clone());
        info!(
            state_dir = %config.state_dir.display(),
            resolvers = pool.len(),
            "engine started"
        );
        Self { router, pool, scheduler, ingest, cancel, workers }
    }

    pub fn router(&self) -> &ArtifactStateRouter {
        &self.router
    }

    pub fn pool(&self) -> &ResolverPool {
        &self.pool
    }

    pub fn scheduler(&self) -> &SchedulerHandle {
        &self.scheduler
    }

    pub fn ingest(&self) -> &IngestConsumer {
        &self.ingest
    }

    /// Cancel every worker and wait for them to finish cleaning up.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        for worker in self.workers {
            let _ = worker.await;
        }
        // owners checkpoint on their way out
        while self.router.active_owners() > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        info!("engine stopped");
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
