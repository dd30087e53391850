// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`. Factories
//! panic on malformed literals since they only ever see test input.

#![allow(clippy::expect_used)]

use crate::{ArtifactCoordinates, CommitDetails, CommitSha, Event, RepoUrl};

pub fn coords(group: &str, artifact: &str) -> ArtifactCoordinates {
    ArtifactCoordinates::new(group, artifact)
}

pub fn repo(url: &str) -> RepoUrl {
    RepoUrl::parse(url).expect("test repo url")
}

pub fn sha(raw: &str) -> CommitSha {
    CommitSha::parse(raw).expect("test sha")
}

/// Commit details for `sha` found in `repository`, link included.
pub fn details(repository: &str, commit_id: &str) -> CommitDetails {
    CommitDetails::builder()
        .commit_id(commit_id)
        .link(CommitDetails::link_for(&repo(repository), commit_id))
        .build()
}

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for the per-artifact state machine.
pub mod strategies {
    use super::{commit_extracted, commit_resolved, commit_unresolvable};
    use super::{repository_registered, version_registered};
    use crate::Event;
    use proptest::prelude::*;

    pub fn arb_version() -> impl Strategy<Value = String> {
        prop_oneof![
            (0u8..4, 0u8..12).prop_map(|(major, minor)| format!("{major}.{minor}")),
            (0u8..4, 0u8..3).prop_map(|(major, rc)| format!("{major}.0-rc{rc}")),
            (0u8..4).prop_map(|major| format!("{major}.1-SNAPSHOT")),
        ]
    }

    pub fn arb_sha() -> impl Strategy<Value = String> {
        "[0-9a-f]{8}"
    }

    pub fn arb_repo() -> impl Strategy<Value = String> {
        (0u8..4).prop_map(|n| format!("https://example.com/repo{n}.git"))
    }

    /// Any event the owner could persist, over a small key space so that
    /// sequences revisit the same versions and repositories.
    pub fn arb_event() -> impl Strategy<Value = Event> {
        prop_oneof![
            arb_repo().prop_map(|r| repository_registered(&r)),
            arb_version().prop_map(|v| version_registered(&v)),
            (arb_version(), arb_sha()).prop_map(|(v, s)| commit_extracted(&v, &s)),
            (arb_version(), arb_repo(), arb_sha())
                .prop_map(|(v, r, s)| commit_resolved(&v, &r, &s)),
            (arb_version(), arb_sha()).prop_map(|(v, s)| commit_unresolvable(&v, &s)),
            Just(Event::Custom),
        ]
    }

    pub fn arb_events(max: usize) -> impl Strategy<Value = Vec<Event>> {
        prop::collection::vec(arb_event(), 0..max)
    }
}

// ── Event factory functions ─────────────────────────────────────────────────

pub fn artifact_registered(group: &str, artifact: &str) -> Event {
    Event::ArtifactRegistered { coordinates: coords(group, artifact) }
}

pub fn repository_registered(url: &str) -> Event {
    Event::RepositoryRegistered { repository: repo(url) }
}

pub fn version_registered(version: &str) -> Event {
    Event::VersionRegistered { version: version.to_string() }
}

pub fn commit_extracted(version: &str, raw_sha: &str) -> Event {
    Event::CommitExtracted { version: version.to_string(), sha: sha(raw_sha) }
}

pub fn commit_resolved(version: &str, repository: &str, commit_id: &str) -> Event {
    Event::CommitResolved {
        version: version.to_string(),
        repository: repo(repository),
        details: Box::new(details(repository, commit_id)),
    }
}

pub fn commit_unresolvable(version: &str, raw_sha: &str) -> Event {
    Event::CommitUnresolvable { version: version.to_string(), sha: sha(raw_sha) }
}
