//! Recovery specs
//!
//! Work recorded before a restart is picked up by the resync scheduler
//! without any new upstream fact, and checkouts do not outlive the engine.

use crate::prelude::*;

#[tokio::test]
async fn resync_resolves_work_recorded_before_restart() {
    if !git_available() {
        return;
    }
    let upstream = Upstream::new();
    let id = upstream.commit("Release 4.0");
    let state = TempDir::new().unwrap();
    let publisher = FakePublisher::new();

    let engine = start(quiet_config(&state), &publisher);
    let handle = engine.router().handle(&artifact()).unwrap();
    handle.register_raw_commit("4.0", CommitSha::parse(&id[..8]).unwrap()).await.unwrap();
    handle.register_repository(RepoUrl::parse(&upstream.url()).unwrap()).await.unwrap();
    engine.shutdown().await;
    let before = publisher.published().len();

    let engine = start(config(&state), &publisher);

    eventually(|| async { status(&engine, "4.0").await == Some(CommitStatusKind::Processed) })
        .await;
    assert!(publisher.published().len() > before);
    assert!(publisher
        .published()
        .iter()
        .any(|p| matches!(p, Publication::CommitResolved { details, .. } if details.commit_id == id)));

    engine.shutdown().await;
}

#[tokio::test]
async fn processed_versions_are_not_republished_after_restart() {
    if !git_available() {
        return;
    }
    let upstream = Upstream::new();
    let id = upstream.commit("Release 5.0");
    let state = TempDir::new().unwrap();
    let publisher = FakePublisher::new();

    let engine = start(config(&state), &publisher);
    ingest(
        &engine,
        UpstreamFact::CommitExtracted {
            coordinates: artifact(),
            version: "5.0".into(),
            sha: id.clone(),
        },
    )
    .await;
    ingest(
        &engine,
        UpstreamFact::RepositoryAssociated { coordinates: artifact(), repository: upstream.url() },
    )
    .await;
    eventually(|| async { !publisher.published().is_empty() }).await;
    engine.shutdown().await;

    let engine = start(config(&state), &publisher);
    // two resync intervals
    tokio::time::sleep(std::time::Duration::from_millis(500)).await;

    assert_eq!(status(&engine, "5.0").await, Some(CommitStatusKind::Processed));
    assert_eq!(publisher.published().len(), 1);
    engine.shutdown().await;
}

#[tokio::test]
async fn checkouts_are_removed_on_shutdown() {
    if !git_available() {
        return;
    }
    let upstream = Upstream::new();
    let id = upstream.commit("Release 6.0");
    let state = TempDir::new().unwrap();
    let publisher = FakePublisher::new();
    let config = quiet_config(&state);
    let scratch = config.scratch_dir.clone();
    let engine = start(config, &publisher);

    ingest(
        &engine,
        UpstreamFact::CommitExtracted { coordinates: artifact(), version: "6.0".into(), sha: id },
    )
    .await;
    ingest(
        &engine,
        UpstreamFact::RepositoryAssociated { coordinates: artifact(), repository: upstream.url() },
    )
    .await;
    eventually(|| async { !publisher.published().is_empty() }).await;
    engine.shutdown().await;

    let leftovers = std::fs::read_dir(&scratch).map(|entries| entries.count()).unwrap_or(0);
    assert_eq!(leftovers, 0, "checkouts left in {}", scratch.display());
}
