//! Resolution specs
//!
//! Facts arriving from upstream drive a sha through clone, lookup, and
//! publication of the full commit metadata.

use crate::prelude::*;

fn registered(version: &str) -> UpstreamFact {
    UpstreamFact::VersionRegistered { coordinates: artifact(), version: version.into() }
}

fn extracted(version: &str, sha: &str) -> UpstreamFact {
    UpstreamFact::CommitExtracted {
        coordinates: artifact(),
        version: version.into(),
        sha: sha.into(),
    }
}

fn associated(upstream: &Upstream) -> UpstreamFact {
    UpstreamFact::RepositoryAssociated { coordinates: artifact(), repository: upstream.url() }
}

#[tokio::test]
async fn abbreviated_sha_resolves_to_full_commit() {
    if !git_available() {
        return;
    }
    let upstream = Upstream::new();
    let id = upstream.commit("Release 1.0\n\nShip it.");
    let state = TempDir::new().unwrap();
    let publisher = FakePublisher::new();
    let engine = start(quiet_config(&state), &publisher);

    ingest(&engine, UpstreamFact::ArtifactRegistered { coordinates: artifact() }).await;
    ingest(&engine, registered("1.0")).await;
    ingest(&engine, extracted("1.0", &id[..10])).await;
    assert_eq!(ingest(&engine, associated(&upstream)).await, IngestOutcome::Applied);

    eventually(|| async { status(&engine, "1.0").await == Some(CommitStatusKind::Processed) })
        .await;
    let published = publisher.published();
    let [Publication::CommitResolved { version, repository, details, .. }] = published.as_slice()
    else {
        panic!("expected one resolution, got {published:?}");
    };
    assert_eq!(version, "1.0");
    assert_eq!(repository.as_str(), upstream.url());
    assert_eq!(details.commit_id, id);

    engine.shutdown().await;
}

#[tokio::test]
async fn sha_found_nowhere_is_unresolvable_until_a_new_repository_arrives() {
    if !git_available() {
        return;
    }
    let first = Upstream::new();
    first.commit("Unrelated history");
    let second = Upstream::new();
    let id = second.commit("Release 2.0");
    let state = TempDir::new().unwrap();
    let publisher = FakePublisher::new();
    let engine = start(quiet_config(&state), &publisher);

    ingest(&engine, registered("2.0")).await;
    ingest(&engine, extracted("2.0", &id)).await;
    ingest(&engine, associated(&first)).await;

    eventually(|| async { status(&engine, "2.0").await == Some(CommitStatusKind::Missing) }).await;
    assert!(matches!(
        publisher.published().as_slice(),
        [Publication::CommitUnresolvable { repository: Some(tried), .. }] if tried.as_str() == first.url()
    ));

    ingest(&engine, associated(&second)).await;

    eventually(|| async { status(&engine, "2.0").await == Some(CommitStatusKind::Processed) })
        .await;
    assert!(matches!(
        publisher.published().last(),
        Some(Publication::CommitResolved { repository, details, .. })
            if repository.as_str() == second.url() && details.commit_id == id
    ));

    engine.shutdown().await;
}

#[tokio::test]
async fn requested_resolution_searches_candidate_repositories() {
    if !git_available() {
        return;
    }
    let upstream = Upstream::new();
    let id = upstream.commit("Hotfix");
    let state = TempDir::new().unwrap();
    let publisher = FakePublisher::new();
    let engine = start(quiet_config(&state), &publisher);

    ingest(&engine, registered("1.0.1")).await;
    ingest(&engine, extracted("1.0.1", &id[..12])).await;
    let outcome = ingest(
        &engine,
        UpstreamFact::ResolutionRequested {
            coordinates: artifact(),
            version: "1.0.1".into(),
            sha: id[..12].into(),
            repositories: vec![upstream.url()],
        },
    )
    .await;

    assert_eq!(outcome, IngestOutcome::Applied);
    eventually(|| async { !publisher.published().is_empty() }).await;
    assert_eq!(status(&engine, "1.0.1").await, Some(CommitStatusKind::Processed));

    engine.shutdown().await;
}

#[tokio::test]
async fn outbox_receives_published_outcomes() {
    if !git_available() {
        return;
    }
    let upstream = Upstream::new();
    let id = upstream.commit("Release 3.0");
    let state = TempDir::new().unwrap();
    let config = quiet_config(&state);
    let outbox = OutboxPublisher::new(config.outbox_path());
    let engine = Engine::start(config, CliGit::new(), outbox.clone(), CancellationToken::new());

    ingest(&engine, extracted("3.0", &id)).await;
    ingest(&engine, associated(&upstream)).await;

    eventually(|| async {
        std::fs::read_to_string(outbox.path()).is_ok_and(|lines| lines.contains(&id))
    })
    .await;
    let lines = std::fs::read_to_string(outbox.path()).unwrap();
    assert_eq!(lines.lines().count(), 1);
    assert!(lines.contains("\"type\":\"commit:resolved\""));

    engine.shutdown().await;
}
