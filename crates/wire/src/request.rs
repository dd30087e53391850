// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use prov_core::ArtifactCoordinates;
use serde::{Deserialize, Serialize};

/// Request from a collaborator to the daemon
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Request {
    /// Health check ping
    Ping,

    /// Version handshake
    Hello { version: String },

    /// Deliver an upstream fact. Kept as raw JSON so that a fact the
    /// daemon does not understand is acknowledged rather than failing the
    /// whole request.
    Fact { fact: serde_json::Value },

    /// Include an artifact in periodic resync
    Track { coordinates: ArtifactCoordinates },

    /// Look up the commit status of one version
    Status { coordinates: ArtifactCoordinates, version: String },

    /// Request daemon shutdown
    Shutdown,
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
