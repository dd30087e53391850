// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use prov_core::test_support::{coords, details, repo, sha};
use tempfile::tempdir;

fn resolved() -> Publication {
    Publication::CommitResolved {
        coordinates: coords("g", "a"),
        version: "1.0".into(),
        repository: repo("https://h/r.git"),
        details: Box::new(details("https://h/r.git", "deadbeef")),
    }
}

fn unresolvable() -> Publication {
    Publication::CommitUnresolvable {
        coordinates: coords("g", "a"),
        version: "1.1".into(),
        repository: None,
        sha: sha("feedface"),
    }
}

#[tokio::test]
async fn outbox_appends_json_lines() {
    let dir = tempdir().unwrap();
    let publisher = OutboxPublisher::new(dir.path().join("outbox.jsonl"));

    publisher.publish(resolved()).await.unwrap();
    publisher.publish(unresolvable()).await.unwrap();

    let contents = std::fs::read_to_string(publisher.path()).unwrap();
    let lines: Vec<serde_json::Value> =
        contents.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["type"], "commit:resolved");
    assert_eq!(lines[0]["details"]["commit_id"], "deadbeef");
    assert!(lines[0]["published_at"].is_string());
    assert_eq!(lines[1]["type"], "commit:unresolvable");
    assert_eq!(lines[1]["repository"], serde_json::Value::Null);
    assert_eq!(lines[1]["sha"], "feedface");
}

#[tokio::test]
async fn outbox_records_parse_back_into_publications() {
    let dir = tempdir().unwrap();
    let publisher = OutboxPublisher::new(dir.path().join("outbox.jsonl"));
    publisher.publish(resolved()).await.unwrap();

    let contents = std::fs::read_to_string(publisher.path()).unwrap();
    let parsed: Publication = serde_json::from_str(contents.trim()).unwrap();
    assert_eq!(parsed, resolved());
}

#[tokio::test]
async fn concurrent_publishes_do_not_interleave() {
    let dir = tempdir().unwrap();
    let publisher = OutboxPublisher::new(dir.path().join("outbox.jsonl"));

    let mut tasks = Vec::new();
    for _ in 0..16 {
        let p = publisher.clone();
        tasks.push(tokio::spawn(async move { p.publish(resolved()).await }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let contents = std::fs::read_to_string(publisher.path()).unwrap();
    assert_eq!(contents.lines().count(), 16);
    for line in contents.lines() {
        serde_json::from_str::<Publication>(line).unwrap();
    }
}

#[tokio::test]
async fn fake_records_in_order() {
    let fake = FakePublisher::new();
    fake.publish(resolved()).await.unwrap();
    fake.publish(unresolvable()).await.unwrap();
    assert_eq!(fake.published(), vec![resolved(), unresolvable()]);
}
