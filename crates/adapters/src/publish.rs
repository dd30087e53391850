// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Downstream publication of resolution outcomes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use prov_core::{ArtifactCoordinates, CommitDetails, CommitSha, RepoUrl};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

/// Errors from publish operations
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// An outcome collaborators consume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Publication {
    #[serde(rename = "commit:resolved")]
    CommitResolved {
        coordinates: ArtifactCoordinates,
        version: String,
        repository: RepoUrl,
        details: Box<CommitDetails>,
    },

    /// Resolution definitively failed; `repository` is absent when no
    /// repository could be checked out at all.
    #[serde(rename = "commit:unresolvable")]
    CommitUnresolvable {
        coordinates: ArtifactCoordinates,
        version: String,
        repository: Option<RepoUrl>,
        sha: CommitSha,
    },
}

impl Publication {
    pub fn coordinates(&self) -> &ArtifactCoordinates {
        match self {
            Publication::CommitResolved { coordinates, .. }
            | Publication::CommitUnresolvable { coordinates, .. } => coordinates,
        }
    }
}

/// Adapter for publishing resolution outcomes
#[async_trait]
pub trait PublishAdapter: Clone + Send + Sync + 'static {
    async fn publish(&self, publication: Publication) -> Result<(), PublishError>;
}

#[derive(Serialize)]
struct OutboxRecord<'a> {
    published_at: DateTime<Utc>,
    #[serde(flatten)]
    publication: &'a Publication,
}

/// Appends publications as JSON lines to an outbox file.
#[derive(Clone)]
pub struct OutboxPublisher {
    path: PathBuf,
    write_lock: Arc<tokio::sync::Mutex<()>>,
}

impl OutboxPublisher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Arc::new(tokio::sync::Mutex::new(())) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl PublishAdapter for OutboxPublisher {
    async fn publish(&self, publication: Publication) -> Result<(), PublishError> {
        let record = OutboxRecord { published_at: Utc::now(), publication: &publication };
        let mut line = serde_json::to_vec(&record)?;
        line.push(b'\n');

        let _guard = self.write_lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;
        tracing::debug!(coords = %publication.coordinates(), "published outcome");
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{Publication, PublishAdapter, PublishError};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Fake publisher that records publications
    #[derive(Clone, Default)]
    pub struct FakePublisher {
        inner: Arc<Mutex<Vec<Publication>>>,
    }

    impl FakePublisher {
        pub fn new() -> Self {
            Self::default()
        }

        /// Get all recorded publications
        pub fn published(&self) -> Vec<Publication> {
            self.inner.lock().clone()
        }
    }

    #[async_trait]
    impl PublishAdapter for FakePublisher {
        async fn publish(&self, publication: Publication) -> Result<(), PublishError> {
            self.inner.lock().push(publication);
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakePublisher;

#[cfg(test)]
#[path = "publish_tests.rs"]
mod tests;
