// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized git state for one artifact, folded from its journal

mod work;

pub use work::{PendingCommit, UnresolvedWork, UNRESOLVED_BATCH};

use indexmap::IndexSet;
use prov_core::{ArtifactCoordinates, CommitStatus, Event, RepoUrl};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lifecycle phase of an artifact's git state. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Empty,
    Registered,
    RepositoryAssociated,
}

prov_core::simple_display! {
    Phase {
        Empty => "empty",
        Registered => "registered",
        RepositoryAssociated => "repository_associated",
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactGitState {
    #[serde(default)]
    pub coordinates: Option<ArtifactCoordinates>,
    /// Candidate remotes in registration order. Never shrinks.
    #[serde(default)]
    pub repositories: IndexSet<RepoUrl>,
    #[serde(default)]
    pub versions: BTreeMap<String, CommitStatus>,
}

impl ArtifactGitState {
    pub fn phase(&self) -> Phase {
        if !self.repositories.is_empty() {
            Phase::RepositoryAssociated
        } else if self.coordinates.is_some() || !self.versions.is_empty() {
            Phase::Registered
        } else {
            Phase::Empty
        }
    }

    pub fn status(&self, version: &str) -> Option<&CommitStatus> {
        self.versions.get(version)
    }

    pub fn has_repository(&self, repository: &RepoUrl) -> bool {
        self.repositories.contains(repository)
    }

    /// Apply an event to derive state changes.
    ///
    /// # Idempotency Requirement
    ///
    /// **All event handlers MUST be idempotent.** Replaying a journal after a
    /// crash between append and checkpoint applies some events twice, and
    /// applying the same event twice must produce the same state as once.
    ///
    /// - `Processed` is terminal: nothing after it changes the version.
    /// - A newly inserted repository moves every `Missing` version back to
    ///   `HasCommit`. Re-registering a known repository changes nothing.
    /// - `CommitUnresolvable` only lands on a version still pending the same sha.
    pub fn apply_event(&mut self, event: &Event) {
        match event {
            Event::ArtifactRegistered { coordinates } => {
                if self.coordinates.is_none() {
                    self.coordinates = Some(coordinates.clone());
                }
            }

            Event::RepositoryRegistered { repository } => {
                if self.repositories.insert(repository.clone()) {
                    self.requeue_missing();
                }
            }

            Event::VersionRegistered { version } => {
                self.versions.entry(version.clone()).or_insert(CommitStatus::Unchecked);
            }

            Event::CommitExtracted { version, sha } => {
                let status = self.versions.entry(version.clone()).or_insert(CommitStatus::Unchecked);
                let settled = match &*status {
                    CommitStatus::Processed { .. } => true,
                    CommitStatus::Missing { sha: missing } => missing == sha,
                    CommitStatus::Unchecked | CommitStatus::HasCommit { .. } => false,
                };
                if !settled {
                    *status = CommitStatus::HasCommit { sha: sha.clone() };
                }
            }

            Event::CommitResolved { version, repository, details } => {
                let status = self.versions.entry(version.clone()).or_insert(CommitStatus::Unchecked);
                if !status.is_processed() {
                    *status = CommitStatus::Processed {
                        details: details.clone(),
                        repository: repository.clone(),
                    };
                }
            }

            Event::CommitUnresolvable { version, sha } => {
                if let Some(status) = self.versions.get_mut(version) {
                    if status.pending_sha() == Some(sha) {
                        *status = CommitStatus::Missing { sha: sha.clone() };
                    }
                }
            }

            Event::Custom => {}
        }
    }

    /// Whether applying `event` would change this state.
    ///
    /// Lets writers skip persisting no-op events.
    pub fn changes(&self, event: &Event) -> bool {
        match event {
            Event::ArtifactRegistered { .. } => self.coordinates.is_none(),
            Event::RepositoryRegistered { repository } => !self.repositories.contains(repository),
            Event::VersionRegistered { version } => !self.versions.contains_key(version),
            Event::CommitExtracted { version, sha } => match self.versions.get(version) {
                None | Some(CommitStatus::Unchecked) => true,
                Some(CommitStatus::HasCommit { sha: known } | CommitStatus::Missing { sha: known }) => {
                    known != sha
                }
                Some(CommitStatus::Processed { .. }) => false,
            },
            Event::CommitResolved { version, .. } => {
                !self.versions.get(version).is_some_and(CommitStatus::is_processed)
            }
            Event::CommitUnresolvable { version, sha } => {
                self.versions.get(version).and_then(CommitStatus::pending_sha) == Some(sha)
            }
            Event::Custom => false,
        }
    }

    fn requeue_missing(&mut self) {
        for status in self.versions.values_mut() {
            if let CommitStatus::Missing { sha } = status {
                *status = CommitStatus::HasCommit { sha: sha.clone() };
            }
        }
    }
}

#[cfg(test)]
#[path = "../state_tests/mod.rs"]
mod tests;
