// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wiring shared by the worker tests.

use crate::cloner::{ClonerHandle, RepositoryCloner};
use crate::registrar::CommitRegistrar;
use crate::resolver::{CommitResolver, ResolveCommit, ResolverHandle};
use crate::state::{ArtifactHandle, ArtifactStateRouter};
use crate::supervisor::mailbox;
use crate::EngineConfig;
use prov_adapters::{FakeGit, FakePublisher};
use prov_core::test_support::{coords, repo, sha};
use prov_storage::PartitionStore;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub const VALID: &str = "https://example.com/valid.git";
pub const SECOND: &str = "https://example.com/second.git";
pub const INVALID: &str = "https://example.com/invalid.git";
pub const FULL_ID: &str = "deadbeefcafebabe0123456789abcdef01234567";

pub struct Harness {
    pub dir: TempDir,
    pub config: EngineConfig,
    pub git: FakeGit,
    pub publisher: FakePublisher,
    pub router: ArtifactStateRouter,
    pub registrar: CommitRegistrar<FakePublisher>,
    pub cloner: ClonerHandle,
    pub cancel: CancellationToken,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(|config| config)
    }

    pub fn with_config(tune: impl FnOnce(EngineConfig) -> EngineConfig) -> Self {
        let dir = TempDir::new().unwrap();
        let config = tune(EngineConfig::new(dir.path()));
        let cancel = CancellationToken::new();
        let store = Arc::new(PartitionStore::new(&config.state_dir, config.snapshot_every));
        let router = ArtifactStateRouter::new(store, &config, cancel.child_token());
        let git = FakeGit::new();
        let publisher = FakePublisher::new();
        let registrar = CommitRegistrar::new(router.clone(), publisher.clone());

        let (tx, cloner_mailbox) = mailbox(16);
        let cloner = RepositoryCloner::new(git.clone(), &config.scratch_dir, cloner_mailbox);
        tokio::spawn(cloner.run(cancel.clone()));

        Self {
            dir,
            config,
            git,
            publisher,
            router,
            registrar,
            cloner: ClonerHandle::new(tx),
            cancel,
        }
    }

    /// Spawn one resolver.
    pub fn resolver(&self) -> (ResolverHandle, JoinHandle<()>) {
        let (tx, resolver_mailbox) = mailbox(16);
        let resolver = CommitResolver::new(
            "test",
            self.git.clone(),
            self.cloner.clone(),
            self.router.clone(),
            self.registrar.clone(),
            resolver_mailbox,
            &self.config,
        );
        let cancel = self.cancel.clone();
        let task = tokio::spawn(async move {
            let _ = resolver.run(cancel).await;
        });
        (ResolverHandle::new(tx), task)
    }

    /// Register `g:{artifact}` with `repos` and `(version, sha)` pairs.
    pub async fn seed(&self, artifact: &str, repos: &[&str], commits: &[(&str, &str)]) -> ArtifactHandle {
        let handle = self.router.handle(&coords("g", artifact)).unwrap();
        handle.register_artifact().await.unwrap();
        for url in repos {
            handle.register_repository(repo(url)).await.unwrap();
        }
        for (version, raw_sha) in commits {
            handle.register_version(*version).await.unwrap();
            handle.register_raw_commit(*version, sha(raw_sha)).await.unwrap();
        }
        handle
    }

    /// Put a commit with `id` into `url`.
    pub fn commit(&self, url: &str, id: &str) {
        self.git.add_commit(&repo(url), FakeGit::commit(id, "Release\n"));
    }
}

pub fn job(artifact: &str, version: &str, raw_sha: &str) -> ResolveCommit {
    ResolveCommit {
        coordinates: coords("g", artifact),
        version: version.to_string(),
        sha: sha(raw_sha),
        candidates: Vec::new(),
    }
}

/// Poll `check` until it holds.
pub async fn eventually<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for _ in 0..500 {
        if check().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached");
}
