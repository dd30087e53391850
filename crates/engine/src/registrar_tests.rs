// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_helpers::{job, Harness, SECOND, VALID};
use prov_core::test_support::{coords, details, repo};
use prov_core::CommitStatusKind;

async fn status(harness: &Harness, version: &str) -> Option<CommitStatusKind> {
    let handle = harness.router.handle(&coords("g", "a")).unwrap();
    handle.status(version).await.unwrap().map(|s| s.kind())
}

fn resolved() -> Resolution {
    Resolution::Resolved { repository: repo(VALID), details: Box::new(details(VALID, "deadbeef")) }
}

#[tokio::test]
async fn resolved_is_recorded_and_published_once() {
    let harness = Harness::new();
    harness.seed("a", &[VALID], &[("1.0", "deadbeef")]).await;

    harness.registrar.record(&job("a", "1.0", "deadbeef"), &resolved()).await;
    harness.registrar.record(&job("a", "1.0", "deadbeef"), &resolved()).await;

    assert_eq!(status(&harness, "1.0").await, Some(CommitStatusKind::Processed));
    let published = harness.publisher.published();
    assert_eq!(published.len(), 1);
    assert!(matches!(
        &published[0],
        Publication::CommitResolved { coordinates, repository, .. }
            if *coordinates == coords("g", "a") && *repository == repo(VALID)
    ));
}

async fn record_miss(tried: &[&str]) -> (Option<CommitStatusKind>, usize) {
    let harness = Harness::new();
    harness.seed("a", &[VALID, SECOND], &[("1.0", "deadbeef")]).await;

    let resolution = Resolution::NotFound { tried: tried.iter().map(|r| repo(r)).collect() };
    harness.registrar.record(&job("a", "1.0", "deadbeef"), &resolution).await;

    (status(&harness, "1.0").await, harness.publisher.published().len())
}

#[tokio::test]
async fn exhaustive_miss_is_missing() {
    assert_eq!(record_miss(&[VALID, SECOND]).await, (Some(CommitStatusKind::Missing), 1));
}

#[tokio::test]
async fn miss_with_untried_repository_stays_pending() {
    assert_eq!(record_miss(&[VALID]).await, (Some(CommitStatusKind::HasCommit), 0));
}

#[tokio::test]
async fn miss_with_nothing_tried_stays_pending() {
    assert_eq!(record_miss(&[]).await, (Some(CommitStatusKind::HasCommit), 0));
}

#[tokio::test]
async fn artifact_without_repositories_is_never_missing() {
    let harness = Harness::new();
    harness.seed("a", &[], &[("1.0", "deadbeef")]).await;

    harness.registrar.record(&job("a", "1.0", "deadbeef"), &Resolution::NotFound { tried: vec![] }).await;

    assert_eq!(status(&harness, "1.0").await, Some(CommitStatusKind::HasCommit));
    assert!(harness.publisher.published().is_empty());
}

#[tokio::test]
async fn stale_sha_is_not_marked_missing() {
    let harness = Harness::new();
    harness.seed("a", &[VALID], &[("1.0", "cafebabe")]).await;

    let resolution = Resolution::NotFound { tried: vec![repo(VALID)] };
    harness.registrar.record(&job("a", "1.0", "deadbeef"), &resolution).await;

    assert_eq!(status(&harness, "1.0").await, Some(CommitStatusKind::HasCommit));
    assert!(harness.publisher.published().is_empty());
}
