// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fixed set of resolvers, routed by artifact.

use crate::error::EngineError;
use crate::resolver::{Resolution, ResolveCommit, ResolverHandle};
use prov_core::ArtifactCoordinates;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Routes each artifact to the same resolver, so that its resolutions run
/// one after another and reuse that resolver's checkouts.
#[derive(Clone)]
pub struct ResolverPool {
    resolvers: Vec<ResolverHandle>,
}

impl ResolverPool {
    pub fn new(resolvers: Vec<ResolverHandle>) -> Self {
        Self { resolvers }
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    pub fn slot(&self, coords: &ArtifactCoordinates) -> Option<usize> {
        if self.resolvers.is_empty() {
            return None;
        }
        let mut hasher = DefaultHasher::new();
        coords.hash(&mut hasher);
        Some((hasher.finish() % self.resolvers.len() as u64) as usize)
    }

    fn route(&self, coords: &ArtifactCoordinates) -> Result<&ResolverHandle, EngineError> {
        self.slot(coords)
            .and_then(|slot| self.resolvers.get(slot))
            .ok_or(EngineError::Unavailable("resolver pool"))
    }

    pub async fn resolve(&self, job: ResolveCommit) -> Result<Resolution, EngineError> {
        self.route(&job.coordinates)?.resolve(job).await
    }

    pub async fn submit(&self, job: ResolveCommit) -> Result<(), EngineError> {
        self.route(&job.coordinates)?.submit(job).await
    }
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
