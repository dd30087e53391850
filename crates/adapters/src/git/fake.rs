// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted git adapter for tests.

use super::{GitAdapter, GitError, Ident, RawCommit};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use parking_lot::Mutex;
use prov_core::{CommitSha, RepoUrl};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Recorded git call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitCall {
    Clone { url: RepoUrl, dest: PathBuf },
    Fetch { checkout: PathBuf },
    ReadCommit { checkout: PathBuf, sha: CommitSha },
}

#[derive(Default)]
struct FakeGitState {
    calls: Vec<GitCall>,
    unreachable: HashSet<RepoUrl>,
    commits: HashMap<RepoUrl, Vec<RawCommit>>,
    checkouts: HashMap<PathBuf, RepoUrl>,
    fetch_fails: bool,
    clone_delay: Duration,
}

/// Fake git adapter. Clones create empty directories; commits are looked up
/// from the ones registered for the cloned url.
#[derive(Clone, Default)]
pub struct FakeGit {
    inner: Arc<Mutex<FakeGitState>>,
}

impl FakeGit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `url` hold `commit`.
    pub fn add_commit(&self, url: &RepoUrl, commit: RawCommit) {
        self.inner.lock().commits.entry(url.clone()).or_default().push(commit);
    }

    /// Make clones of `url` fail.
    pub fn set_unreachable(&self, url: &RepoUrl) {
        self.inner.lock().unreachable.insert(url.clone());
    }

    pub fn set_fetch_fails(&self, fails: bool) {
        self.inner.lock().fetch_fails = fails;
    }

    /// Delay every clone by `delay` (paused-clock tests advance past it).
    pub fn set_clone_delay(&self, delay: Duration) {
        self.inner.lock().clone_delay = delay;
    }

    pub fn calls(&self) -> Vec<GitCall> {
        self.inner.lock().calls.clone()
    }

    /// Urls cloned so far, in call order.
    pub fn cloned_urls(&self) -> Vec<RepoUrl> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                GitCall::Clone { url, .. } => Some(url.clone()),
                _ => None,
            })
            .collect()
    }

    /// A commit with fixed identities, committed at +02:00.
    pub fn commit(id: &str, message: &str) -> RawCommit {
        let base = DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_default();
        let when = |offset_secs: i32| {
            FixedOffset::east_opt(offset_secs)
                .map(|offset| base.with_timezone(&offset))
                .unwrap_or_else(|| base.fixed_offset())
        };
        RawCommit {
            id: id.to_string(),
            tree: "4b825dc642cb6eb9a060e54bf8d69288fbee4904".to_string(),
            parents: Vec::new(),
            author: Ident { name: "Ada".into(), email: "ada@example.com".into(), time: when(0) },
            committer: Ident {
                name: "Grace".into(),
                email: "grace@example.com".into(),
                time: when(2 * 3600),
            },
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl GitAdapter for FakeGit {
    async fn clone_repo(&self, url: &RepoUrl, dest: &Path) -> Result<(), GitError> {
        let (delay, unreachable) = {
            let mut inner = self.inner.lock();
            inner.calls.push(GitCall::Clone { url: url.clone(), dest: dest.to_path_buf() });
            (inner.clone_delay, inner.unreachable.contains(url))
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if unreachable {
            return Err(GitError::Failed {
                description: "git clone".into(),
                stderr: format!("fatal: repository '{url}' not found"),
            });
        }
        tokio::fs::create_dir_all(dest)
            .await
            .map_err(|e| GitError::Spawn(format!("fake clone: {e}")))?;
        self.inner.lock().checkouts.insert(dest.to_path_buf(), url.clone());
        Ok(())
    }

    async fn fetch(&self, checkout: &Path) -> Result<(), GitError> {
        let mut inner = self.inner.lock();
        inner.calls.push(GitCall::Fetch { checkout: checkout.to_path_buf() });
        if inner.fetch_fails {
            return Err(GitError::Failed {
                description: "git fetch".into(),
                stderr: "fatal: unable to access remote".into(),
            });
        }
        Ok(())
    }

    async fn read_commit(&self, checkout: &Path, sha: &CommitSha) -> Result<RawCommit, GitError> {
        let mut inner = self.inner.lock();
        inner.calls.push(GitCall::ReadCommit { checkout: checkout.to_path_buf(), sha: sha.clone() });
        let url = inner
            .checkouts
            .get(checkout)
            .cloned()
            .ok_or_else(|| GitError::Failed {
                description: "git rev-parse".into(),
                stderr: format!("fatal: not a git repository: {}", checkout.display()),
            })?;
        inner
            .commits
            .get(&url)
            .and_then(|commits| commits.iter().find(|c| sha.matches(&c.id)))
            .cloned()
            .ok_or_else(|| GitError::NotFound(sha.to_string()))
    }
}
