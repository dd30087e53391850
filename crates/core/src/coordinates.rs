// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Artifact and version coordinates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors from parsing coordinate strings
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinatesError {
    #[error("expected {expected} ':'-separated segments in '{input}'")]
    Segments { input: String, expected: usize },
    #[error("empty segment in '{0}'")]
    EmptySegment(String),
}

/// Identifies one artifact, and with it one partition of git state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArtifactCoordinates {
    pub group_id: String,
    pub artifact_id: String,
}

impl ArtifactCoordinates {
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        Self { group_id: group_id.into(), artifact_id: artifact_id.into() }
    }

    /// Attach a version to these coordinates.
    pub fn version(&self, version: impl Into<String>) -> MavenCoordinates {
        MavenCoordinates {
            group_id: self.group_id.clone(),
            artifact_id: self.artifact_id.clone(),
            version: version.into(),
        }
    }
}

impl fmt::Display for ArtifactCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)
    }
}

impl FromStr for ArtifactCoordinates {
    type Err = CoordinatesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [group_id, artifact_id] = split_segments::<2>(s)?;
        Ok(Self::new(group_id, artifact_id))
    }
}

/// An artifact version: `group:artifact:version`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MavenCoordinates {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

impl MavenCoordinates {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self { group_id: group_id.into(), artifact_id: artifact_id.into(), version: version.into() }
    }

    /// Project away the version.
    pub fn artifact(&self) -> ArtifactCoordinates {
        ArtifactCoordinates::new(self.group_id.clone(), self.artifact_id.clone())
    }
}

impl fmt::Display for MavenCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}

impl FromStr for MavenCoordinates {
    type Err = CoordinatesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [group_id, artifact_id, version] = split_segments::<3>(s)?;
        Ok(Self::new(group_id, artifact_id, version))
    }
}

fn split_segments<const N: usize>(s: &str) -> Result<[&str; N], CoordinatesError> {
    let parts: Vec<&str> = s.trim().split(':').collect();
    let parts: [&str; N] = parts
        .try_into()
        .map_err(|_| CoordinatesError::Segments { input: s.to_string(), expected: N })?;
    if parts.iter().any(|p| p.is_empty()) {
        return Err(CoordinatesError::EmptySegment(s.to_string()));
    }
    Ok(parts)
}

#[cfg(test)]
#[path = "coordinates_tests.rs"]
mod tests;
