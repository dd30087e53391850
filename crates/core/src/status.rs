// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-version commit resolution status.

use crate::commit::{CommitDetails, CommitSha};
use crate::repo::RepoUrl;
use serde::{Deserialize, Serialize};

/// Where one version stands in commit resolution.
///
/// `Unchecked -> HasCommit -> Processed` is the happy path. `HasCommit ->
/// Missing` happens when every known repository was tried; `Missing` goes
/// back to `HasCommit` when a new repository is registered. `Processed` is
/// terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CommitStatus {
    Unchecked,
    HasCommit { sha: CommitSha },
    Processed { details: Box<CommitDetails>, repository: RepoUrl },
    Missing { sha: CommitSha },
}

impl CommitStatus {
    pub fn kind(&self) -> CommitStatusKind {
        match self {
            CommitStatus::Unchecked => CommitStatusKind::Unchecked,
            CommitStatus::HasCommit { .. } => CommitStatusKind::HasCommit,
            CommitStatus::Processed { .. } => CommitStatusKind::Processed,
            CommitStatus::Missing { .. } => CommitStatusKind::Missing,
        }
    }

    /// The sha awaiting resolution, if any.
    pub fn pending_sha(&self) -> Option<&CommitSha> {
        match self {
            CommitStatus::HasCommit { sha } => Some(sha),
            _ => None,
        }
    }

    pub fn is_processed(&self) -> bool {
        matches!(self, CommitStatus::Processed { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommitStatusKind {
    Unchecked,
    HasCommit,
    Processed,
    Missing,
}

crate::simple_display! {
    CommitStatusKind {
        Unchecked => "unchecked",
        HasCommit => "has_commit",
        Processed => "processed",
        Missing => "missing",
    }
}
