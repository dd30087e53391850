// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::ArtifactGitState;
use prov_core::{CommitSha, MavenVersion, RepoUrl};
use serde::{Deserialize, Serialize};

/// Default cap on versions handed out per resync cycle.
pub const UNRESOLVED_BATCH: usize = 16;

/// A version whose commit sha is known but not yet resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingCommit {
    pub version: String,
    pub sha: CommitSha,
}

/// Derived view of the work an artifact still needs done.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedWork {
    /// Repositories to search, in registration order.
    pub repositories: Vec<RepoUrl>,
    /// Highest version first, at most `cap` entries.
    pub commits: Vec<PendingCommit>,
}

impl UnresolvedWork {
    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }
}

impl ArtifactGitState {
    /// Versions with a pending sha, highest first, capped at `cap`.
    ///
    /// Empty when no repository is registered, since there is nowhere to look.
    pub fn unresolved_work(&self, cap: usize) -> UnresolvedWork {
        if self.repositories.is_empty() {
            return UnresolvedWork::default();
        }

        let mut pending: Vec<(MavenVersion, PendingCommit)> = self
            .versions
            .iter()
            .filter_map(|(version, status)| {
                status.pending_sha().map(|sha| {
                    (
                        MavenVersion::new(version.as_str()),
                        PendingCommit { version: version.clone(), sha: sha.clone() },
                    )
                })
            })
            .collect();
        pending.sort_by(|(a, _), (b, _)| b.cmp(a));

        UnresolvedWork {
            repositories: self.repositories.iter().cloned().collect(),
            commits: pending.into_iter().take(cap).map(|(_, commit)| commit).collect(),
        }
    }
}
