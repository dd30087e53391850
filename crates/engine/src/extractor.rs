// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reads commit metadata out of a local checkout.

use prov_adapters::GitAdapter;
use prov_core::{CommitDetails, CommitSha, RepoUrl};
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Found(Box<CommitDetails>),
    NotFound,
}

/// Fetches, then looks up a commit. Every failure is reported as
/// [`Extraction::NotFound`].
#[derive(Clone)]
pub struct CommitExtractor<G> {
    git: G,
}

impl<G: GitAdapter> CommitExtractor<G> {
    pub fn new(git: G) -> Self {
        Self { git }
    }

    pub async fn resolve(&self, checkout: &Path, repository: &RepoUrl, sha: &CommitSha) -> Extraction {
        if let Err(e) = self.git.fetch(checkout).await {
            warn!(repo = %repository, sha = %sha, error = %e, "fetch failed");
            return Extraction::NotFound;
        }

        match self.git.read_commit(checkout, sha).await {
            Ok(commit) if sha.matches(&commit.id) => {
                debug!(repo = %repository, sha = %sha, commit = %commit.id, "commit found");
                Extraction::Found(Box::new(commit.details(repository)))
            }
            Ok(commit) => {
                warn!(repo = %repository, sha = %sha, commit = %commit.id, "commit id mismatch");
                Extraction::NotFound
            }
            Err(e) => {
                warn!(repo = %repository, sha = %sha, error = %e, "commit lookup failed");
                Extraction::NotFound
            }
        }
    }
}

#[cfg(test)]
#[path = "extractor_tests.rs"]
mod tests;
