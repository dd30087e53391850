// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use prov_adapters::{FakeGit, FakePublisher};
use prov_core::test_support::coords;
use prov_core::{CommitStatus, CommitStatusKind};
use prov_engine::{Engine, EngineConfig};
use serde_json::json;
use std::time::Duration;
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    engine: Engine,
    ctx: Arc<ListenCtx>,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let config =
            EngineConfig::new(dir.path()).resync_startup_delay(Duration::from_secs(3600));
        let engine =
            Engine::start(config, FakeGit::new(), FakePublisher::new(), CancellationToken::new());
        let ctx = Arc::new(ListenCtx {
            ingest: engine.ingest().clone(),
            router: engine.router().clone(),
            scheduler: engine.scheduler().clone(),
            shutdown: Arc::new(Notify::new()),
        });
        Self { _dir: dir, engine, ctx }
    }

    /// One request over an in-memory connection.
    async fn send(&self, request: Request) -> Response {
        let (client, server) = tokio::io::duplex(64 * 1024);
        let (server_read, server_write) = tokio::io::split(server);
        let ctx = Arc::clone(&self.ctx);
        let task =
            tokio::spawn(async move { handle_connection(server_read, server_write, &ctx).await });

        let (mut client_read, mut client_write) = tokio::io::split(client);
        let timeout = Duration::from_secs(5);
        prov_wire::write_request(&mut client_write, &request, timeout).await.unwrap();
        let response = prov_wire::read_response(&mut client_read, timeout).await.unwrap();
        task.await.unwrap().unwrap();
        response
    }

    async fn shutdown(self) {
        self.engine.shutdown().await;
    }
}

fn coordinates() -> serde_json::Value {
    json!({"group_id": "g", "artifact_id": "a"})
}

#[tokio::test]
async fn ping_and_hello() {
    let fixture = Fixture::new();

    assert_eq!(fixture.send(Request::Ping).await, Response::Pong);
    assert_eq!(
        fixture.send(Request::Hello { version: "0.0.0".into() }).await,
        Response::Hello { version: PROTOCOL_VERSION.to_string() }
    );
    fixture.shutdown().await;
}

#[tokio::test]
async fn facts_update_status() {
    let fixture = Fixture::new();
    let status = Request::Status { coordinates: coords("g", "a"), version: "1.0".into() };

    assert_eq!(fixture.send(status.clone()).await, Response::Status { status: None });

    let fact = json!({"type": "version-registered", "coordinates": coordinates(), "version": "1.0"});
    assert_eq!(fixture.send(Request::Fact { fact }).await, Response::Ok);
    assert_eq!(
        fixture.send(status.clone()).await,
        Response::Status { status: Some(CommitStatus::Unchecked) }
    );

    let fact = json!({
        "type": "commit-extracted",
        "coordinates": coordinates(),
        "version": "1.0",
        "sha": "DEADBEEF",
    });
    assert_eq!(fixture.send(Request::Fact { fact }).await, Response::Ok);
    let Response::Status { status: Some(status) } = fixture.send(status).await else {
        panic!("expected a status");
    };
    assert_eq!(status.kind(), CommitStatusKind::HasCommit);
    assert_eq!(status.pending_sha().map(|s| s.as_str()), Some("deadbeef"));

    fixture.shutdown().await;
}

#[tokio::test]
async fn invalid_values_are_rejected() {
    let fixture = Fixture::new();

    for fact in [
        json!({"type": "commit-extracted", "coordinates": coordinates(), "version": "1.0", "sha": "xyz!"}),
        json!({"type": "repository-associated", "coordinates": coordinates(), "repository": "not a url"}),
    ] {
        let response = fixture.send(Request::Fact { fact }).await;
        assert!(matches!(response, Response::Rejected { .. }), "got {response:?}");
    }
    fixture.shutdown().await;
}

#[tokio::test]
async fn unrecognized_facts_are_acknowledged() {
    let fixture = Fixture::new();

    for fact in [
        json!({"type": "artifact-deleted", "coordinates": coordinates()}),
        json!("artifact-registered"),
        json!({"type": "version-registered"}),
    ] {
        assert_eq!(fixture.send(Request::Fact { fact }).await, Response::Ok);
    }
    assert!(fixture.ctx.router.known_artifacts().unwrap().is_empty());
    fixture.shutdown().await;
}

#[tokio::test]
async fn track_is_acknowledged() {
    let fixture = Fixture::new();

    let response = fixture.send(Request::Track { coordinates: coords("g", "a") }).await;

    assert_eq!(response, Response::Ok);
    fixture.shutdown().await;
}

#[tokio::test]
async fn shutdown_request_notifies() {
    let fixture = Fixture::new();
    let notified = fixture.ctx.shutdown.notified();

    assert_eq!(fixture.send(Request::Shutdown).await, Response::ShuttingDown);
    tokio::time::timeout(Duration::from_secs(1), notified).await.unwrap();
    fixture.shutdown().await;
}

#[tokio::test]
async fn requests_after_engine_stop_report_errors() {
    let fixture = Fixture::new();
    let ctx = Arc::clone(&fixture.ctx);
    fixture.engine.shutdown().await;
    let status = Request::Status { coordinates: coords("g", "a"), version: "1.0".into() };

    let (client, server) = tokio::io::duplex(64 * 1024);
    let (server_read, server_write) = tokio::io::split(server);
    let task = tokio::spawn(async move { handle_connection(server_read, server_write, &ctx).await });
    let (mut client_read, mut client_write) = tokio::io::split(client);
    prov_wire::write_request(&mut client_write, &status, Duration::from_secs(5)).await.unwrap();
    let response = prov_wire::read_response(&mut client_read, Duration::from_secs(5)).await.unwrap();
    task.await.unwrap().unwrap();

    assert!(matches!(response, Response::Error { .. }), "got {response:?}");
}

#[tokio::test]
async fn client_hanging_up_is_not_an_error() {
    let fixture = Fixture::new();
    let (client, server) = tokio::io::duplex(1024);
    let (server_read, server_write) = tokio::io::split(server);
    drop(client);

    let result = handle_connection(server_read, server_write, &fixture.ctx).await;

    assert!(matches!(result, Err(ConnectionError::Protocol(ProtocolError::ConnectionClosed))));
    fixture.shutdown().await;
}
