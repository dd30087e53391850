// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Events persisted to an artifact's journal.
//!
//! Every mutation of an artifact's git state is recorded as one of these
//! before it is applied. Replaying them in order rebuilds the state.

mod methods;

use crate::commit::{CommitDetails, CommitSha};
use crate::coordinates::ArtifactCoordinates;
use crate::repo::RepoUrl;
use serde::{Deserialize, Serialize};

/// Serializes with `{"type": "event:name", ...fields}` format.
/// Unknown type tags deserialize to `Custom`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    #[serde(rename = "artifact:registered")]
    ArtifactRegistered { coordinates: ArtifactCoordinates },

    #[serde(rename = "repository:registered")]
    RepositoryRegistered { repository: RepoUrl },

    #[serde(rename = "version:registered")]
    VersionRegistered { version: String },

    /// A raw sha was read from a built asset's manifest.
    #[serde(rename = "commit:extracted")]
    CommitExtracted { version: String, sha: CommitSha },

    #[serde(rename = "commit:resolved")]
    CommitResolved { version: String, repository: RepoUrl, details: Box<CommitDetails> },

    /// Every known repository was tried without finding `sha`.
    #[serde(rename = "commit:unresolvable")]
    CommitUnresolvable { version: String, sha: CommitSha },

    /// Catch-all for unknown event types
    #[serde(other, skip_serializing)]
    Custom,
}
