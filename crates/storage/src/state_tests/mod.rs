// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

mod properties;

use super::*;
use prov_core::test_support::{
    artifact_registered, commit_extracted, commit_resolved, commit_unresolvable, coords, repo,
    repository_registered, sha, version_registered,
};
use prov_core::CommitStatusKind;

fn fold(events: &[Event]) -> ArtifactGitState {
    let mut state = ArtifactGitState::default();
    for event in events {
        state.apply_event(event);
    }
    state
}

fn kind(state: &ArtifactGitState, version: &str) -> Option<CommitStatusKind> {
    state.status(version).map(CommitStatus::kind)
}

#[test]
fn phase_moves_forward() {
    let mut state = ArtifactGitState::default();
    assert_eq!(state.phase(), Phase::Empty);

    state.apply_event(&artifact_registered("g", "a"));
    assert_eq!(state.phase(), Phase::Registered);
    assert_eq!(state.coordinates, Some(coords("g", "a")));

    state.apply_event(&repository_registered("https://example/repo.git"));
    assert_eq!(state.phase(), Phase::RepositoryAssociated);
}

#[test]
fn a_version_alone_is_registered() {
    let state = fold(&[version_registered("1.0")]);
    assert_eq!(state.phase(), Phase::Registered);
    assert_eq!(kind(&state, "1.0"), Some(CommitStatusKind::Unchecked));
}

#[test]
fn coordinates_are_never_replaced() {
    let state = fold(&[artifact_registered("g", "a"), artifact_registered("x", "y")]);
    assert_eq!(state.coordinates, Some(coords("g", "a")));
}

#[test]
fn repositories_keep_registration_order() {
    let state = fold(&[
        repository_registered("https://h/b"),
        repository_registered("https://h/a"),
        repository_registered("https://h/b"),
    ]);
    let urls: Vec<&str> = state.repositories.iter().map(RepoUrl::as_str).collect();
    assert_eq!(urls, vec!["https://h/b", "https://h/a"]);
}

#[test]
fn end_to_end_scenario() {
    let mut state = fold(&[artifact_registered("g", "a"), commit_extracted("1.0", "deadbeef")]);
    assert!(state.unresolved_work(UNRESOLVED_BATCH).is_empty());

    state.apply_event(&repository_registered("https://example/repo.git"));
    let work = state.unresolved_work(UNRESOLVED_BATCH);
    assert_eq!(work.repositories, vec![repo("https://example/repo.git")]);
    assert_eq!(work.commits, vec![PendingCommit { version: "1.0".into(), sha: sha("deadbeef") }]);

    let resolved = commit_resolved("1.0", "https://example/repo.git", "deadbeef");
    state.apply_event(&resolved);
    let after_first = state.clone();
    state.apply_event(&resolved);
    assert_eq!(state, after_first);
    assert_eq!(kind(&state, "1.0"), Some(CommitStatusKind::Processed));
    assert!(state.unresolved_work(UNRESOLVED_BATCH).is_empty());
}

#[yare::parameterized(
    unchecked_to_has_commit = { vec![version_registered("1.0")], CommitStatusKind::HasCommit },
    unknown_to_has_commit   = { vec![], CommitStatusKind::HasCommit },
    replaces_pending_sha    = { vec![commit_extracted("1.0", "aaaa")], CommitStatusKind::HasCommit },
    processed_is_terminal   = {
        vec![commit_resolved("1.0", "https://h/r", "aaaa")],
        CommitStatusKind::Processed
    },
    same_sha_stays_missing  = {
        vec![
            repository_registered("https://h/r"),
            commit_extracted("1.0", "deadbeef"),
            commit_unresolvable("1.0", "deadbeef"),
        ],
        CommitStatusKind::Missing
    },
    new_sha_leaves_missing  = {
        vec![
            repository_registered("https://h/r"),
            commit_extracted("1.0", "aaaa"),
            commit_unresolvable("1.0", "aaaa"),
        ],
        CommitStatusKind::HasCommit
    },
)]
fn commit_extracted_transitions(prior: Vec<Event>, expected: CommitStatusKind) {
    let mut state = fold(&prior);
    state.apply_event(&commit_extracted("1.0", "deadbeef"));
    assert_eq!(kind(&state, "1.0"), Some(expected));
}

#[test]
fn version_registered_does_not_reset_status() {
    let state = fold(&[commit_extracted("1.0", "deadbeef"), version_registered("1.0")]);
    assert_eq!(kind(&state, "1.0"), Some(CommitStatusKind::HasCommit));
}

#[test]
fn unresolvable_requires_matching_pending_sha() {
    let mut state = fold(&[commit_extracted("1.0", "deadbeef")]);
    state.apply_event(&commit_unresolvable("1.0", "feedface"));
    assert_eq!(kind(&state, "1.0"), Some(CommitStatusKind::HasCommit));

    state.apply_event(&commit_unresolvable("2.0", "deadbeef"));
    assert_eq!(kind(&state, "2.0"), None);

    state.apply_event(&commit_unresolvable("1.0", "deadbeef"));
    assert_eq!(
        state.status("1.0"),
        Some(&CommitStatus::Missing { sha: sha("deadbeef") })
    );
}

#[test]
fn new_repository_requeues_missing_versions() {
    let mut state = fold(&[
        repository_registered("https://h/one"),
        commit_extracted("1.0", "deadbeef"),
        commit_extracted("2.0", "feedface"),
        commit_unresolvable("1.0", "deadbeef"),
        commit_unresolvable("2.0", "feedface"),
    ]);
    assert!(state.unresolved_work(UNRESOLVED_BATCH).is_empty());

    // known repository: nothing changes
    state.apply_event(&repository_registered("https://h/one/"));
    assert!(state.unresolved_work(UNRESOLVED_BATCH).is_empty());

    state.apply_event(&repository_registered("https://h/two"));
    let work = state.unresolved_work(UNRESOLVED_BATCH);
    let versions: Vec<&str> = work.commits.iter().map(|c| c.version.as_str()).collect();
    assert_eq!(versions, vec!["2.0", "1.0"]);
    assert_eq!(work.repositories.len(), 2);
}

#[test]
fn unresolved_work_is_ordered_and_capped() {
    let mut events = vec![repository_registered("https://h/r")];
    for minor in 0..20 {
        events.push(commit_extracted(&format!("1.{minor}"), "deadbeef"));
    }
    events.push(commit_extracted("2.0-SNAPSHOT", "deadbeef"));
    events.push(commit_resolved("1.19", "https://h/r", "deadbeef"));
    let state = fold(&events);

    let work = state.unresolved_work(UNRESOLVED_BATCH);
    assert_eq!(work.commits.len(), UNRESOLVED_BATCH);
    assert_eq!(work.commits[0].version, "2.0-SNAPSHOT");
    assert_eq!(work.commits[1].version, "1.18");
    assert_eq!(work.commits[2].version, "1.17");
    assert!(work.commits.iter().all(|c| c.version != "1.19"));
}

#[test]
fn custom_events_are_ignored() {
    let state = fold(&[artifact_registered("g", "a")]);
    let mut after = state.clone();
    after.apply_event(&Event::Custom);
    assert_eq!(after, state);
}

#[test]
fn state_serde_round_trip_keeps_order() {
    let state = fold(&[
        artifact_registered("g", "a"),
        repository_registered("https://h/z"),
        repository_registered("https://h/a"),
        commit_resolved("1.0", "https://h/z", "deadbeef"),
    ]);
    let json = serde_json::to_string(&state).unwrap();
    let back: ArtifactGitState = serde_json::from_str(&json).unwrap();
    assert_eq!(back, state);
    assert_eq!(back.repositories.first(), Some(&repo("https://h/z")));
}
