// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use prov_core::CommitStatus;
use serde::{Deserialize, Serialize};

/// Response from daemon to a collaborator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    /// Generic success (a fact that changed nothing is still `Ok`)
    Ok,

    /// Health check response
    Pong,

    /// Version handshake response
    Hello { version: String },

    /// The fact carried an invalid value
    Rejected { reason: String },

    /// Commit status of a version; `None` when the version is unknown
    Status { status: Option<CommitStatus> },

    /// Daemon is shutting down
    ShuttingDown,

    /// Error response
    Error { message: String },
}
