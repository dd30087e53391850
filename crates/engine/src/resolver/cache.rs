// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::cloner::remove_checkout;
use indexmap::IndexMap;
use prov_core::{ArtifactCoordinates, RepoUrl};
use std::path::PathBuf;

/// Checkouts kept by one resolver, per artifact, least recently used first.
pub(super) struct CheckoutCache {
    capacity: usize,
    entries: IndexMap<ArtifactCoordinates, IndexMap<RepoUrl, PathBuf>>,
}

impl CheckoutCache {
    pub(super) fn new(capacity: usize) -> Self {
        Self { capacity: capacity.max(1), entries: IndexMap::new() }
    }

    /// Repositories with a checkout for `coords`.
    pub(super) fn repositories(&self, coords: &ArtifactCoordinates) -> Vec<RepoUrl> {
        self.entries.get(coords).map(|repos| repos.keys().cloned().collect()).unwrap_or_default()
    }

    /// Add checkouts for `coords` and mark it most recently used.
    ///
    /// Returns directories that are no longer referenced: replaced checkouts
    /// and those of evicted artifacts.
    pub(super) fn insert(
        &mut self,
        coords: &ArtifactCoordinates,
        checkouts: IndexMap<RepoUrl, PathBuf>,
    ) -> Vec<PathBuf> {
        let mut released = Vec::new();
        let mut repos = self.entries.shift_remove(coords).unwrap_or_default();
        for (repo, path) in checkouts {
            if let Some(old) = repos.insert(repo, path) {
                released.push(old);
            }
        }
        self.entries.insert(coords.clone(), repos);

        while self.entries.len() > self.capacity {
            if let Some((evicted, repos)) = self.entries.shift_remove_index(0) {
                tracing::debug!(coords = %evicted, checkouts = repos.len(), "evicting checkouts");
                released.extend(repos.into_values());
            }
        }
        released
    }

    /// Cached checkouts for `coords`, in the order of `wanted`.
    pub(super) fn checkouts_for(
        &self,
        coords: &ArtifactCoordinates,
        wanted: &[RepoUrl],
    ) -> Vec<(RepoUrl, PathBuf)> {
        let Some(repos) = self.entries.get(coords) else {
            return Vec::new();
        };
        wanted
            .iter()
            .filter_map(|repo| repos.get(repo).map(|path| (repo.clone(), path.clone())))
            .collect()
    }

    pub(super) fn touch(&mut self, coords: &ArtifactCoordinates) {
        if let Some(index) = self.entries.get_index_of(coords) {
            let last = self.entries.len() - 1;
            self.entries.move_index(index, last);
        }
    }

    #[cfg(test)]
    pub(super) fn artifacts(&self) -> Vec<ArtifactCoordinates> {
        self.entries.keys().cloned().collect()
    }

    /// Delete every checkout.
    pub(super) async fn clear(&mut self) {
        for (_, repos) in self.entries.drain(..) {
            for path in repos.into_values() {
                remove_checkout(&path).await;
            }
        }
    }
}

impl Drop for CheckoutCache {
    /// Checkouts still held here, as after a resolver panicked, are deleted.
    fn drop(&mut self) {
        let paths: Vec<PathBuf> =
            self.entries.drain(..).flat_map(|(_, repos)| repos.into_values()).collect();
        if paths.is_empty() {
            return;
        }
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move {
                    for path in paths {
                        remove_checkout(&path).await;
                    }
                });
            }
            Err(_) => {
                for path in paths {
                    let _ = std::fs::remove_dir_all(&path);
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
