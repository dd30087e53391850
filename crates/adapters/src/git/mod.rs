// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Git access: cloning, fetching, and reading commit objects.

mod cli;
mod parse;

pub use cli::CliGit;
pub use parse::{parse_commit, Ident, RawCommit};

use async_trait::async_trait;
use prov_core::{CommitSha, RepoUrl};
use std::path::Path;
use thiserror::Error;

/// Errors from git operations
#[derive(Debug, Error)]
pub enum GitError {
    #[error("{0}")]
    Spawn(String),
    #[error("{description} failed: {stderr}")]
    Failed { description: String, stderr: String },
    #[error("commit {0} not found")]
    NotFound(String),
    #[error("unparseable commit object: {0}")]
    Parse(String),
}

/// Adapter for the git operations commit resolution needs
#[async_trait]
pub trait GitAdapter: Clone + Send + Sync + 'static {
    /// Clone `url` into `dest`, which must not exist yet.
    async fn clone_repo(&self, url: &RepoUrl, dest: &Path) -> Result<(), GitError>;

    /// Fetch new commits, submodules, and tags into an existing checkout.
    async fn fetch(&self, checkout: &Path) -> Result<(), GitError>;

    /// Read and parse the commit `sha` from a checkout.
    async fn read_commit(&self, checkout: &Path, sha: &CommitSha) -> Result<RawCommit, GitError>;
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake;

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeGit, GitCall};
