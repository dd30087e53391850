// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::Event;

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::ArtifactRegistered { .. } => "artifact:registered",
            Event::RepositoryRegistered { .. } => "repository:registered",
            Event::VersionRegistered { .. } => "version:registered",
            Event::CommitExtracted { .. } => "commit:extracted",
            Event::CommitResolved { .. } => "commit:resolved",
            Event::CommitUnresolvable { .. } => "commit:unresolvable",
            Event::Custom => "custom",
        }
    }

    /// The version this event concerns, if it concerns one.
    pub fn version(&self) -> Option<&str> {
        match self {
            Event::VersionRegistered { version }
            | Event::CommitExtracted { version, .. }
            | Event::CommitResolved { version, .. }
            | Event::CommitUnresolvable { version, .. } => Some(version),
            Event::ArtifactRegistered { .. }
            | Event::RepositoryRegistered { .. }
            | Event::Custom => None,
        }
    }

    /// One-line summary for logs.
    pub fn log_summary(&self) -> String {
        let t = self.name();
        match self {
            Event::ArtifactRegistered { coordinates } => format!("{t} coords={coordinates}"),
            Event::RepositoryRegistered { repository } => format!("{t} repo={repository}"),
            Event::VersionRegistered { version } => format!("{t} version={version}"),
            Event::CommitExtracted { version, sha } | Event::CommitUnresolvable { version, sha } => {
                format!("{t} version={version} sha={}", crate::id::short(sha.as_str(), 12))
            }
            Event::CommitResolved { version, repository, details } => {
                format!(
                    "{t} version={version} repo={repository} sha={}",
                    crate::id::short(&details.commit_id, 12)
                )
            }
            Event::Custom => t.to_string(),
        }
    }
}
