// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Handlers that reach into the engine.

use prov_core::ArtifactCoordinates;
use prov_engine::{EngineError, IngestOutcome};
use prov_wire::Response;
use tracing::warn;

use super::ListenCtx;

pub(super) async fn handle_fact(ctx: &ListenCtx, fact: serde_json::Value) -> Response {
    match ctx.ingest.ingest_value(fact).await {
        Ok(IngestOutcome::Applied | IngestOutcome::NoOp) => Response::Ok,
        Ok(IngestOutcome::Rejected(reason)) => Response::Rejected { reason },
        Err(e) => engine_error("fact", e),
    }
}

pub(super) async fn handle_track(ctx: &ListenCtx, coordinates: ArtifactCoordinates) -> Response {
    match ctx.scheduler.track(coordinates).await {
        Ok(()) => Response::Ok,
        Err(e) => engine_error("track", e),
    }
}

pub(super) async fn handle_status(
    ctx: &ListenCtx,
    coordinates: ArtifactCoordinates,
    version: String,
) -> Response {
    let result = match ctx.router.handle(&coordinates) {
        Ok(handle) => handle.status(version).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(status) => Response::Status { status },
        Err(e) => engine_error("status", e),
    }
}

fn engine_error(request: &str, e: EngineError) -> Response {
    warn!(request, error = %e, "request failed");
    Response::Error { message: e.to_string() }
}
