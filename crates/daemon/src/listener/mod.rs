// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Unix socket front door.
//!
//! Each connection carries one request and gets one response, served on its
//! own task. Facts go to the engine's ingest consumer.

mod facts;

use std::sync::Arc;

use prov_engine::{ArtifactStateRouter, IngestConsumer, SchedulerHandle};
use prov_wire::{ProtocolError, Request, Response, PROTOCOL_VERSION};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::net::UnixListener;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::env::ipc_timeout;

/// Engine handles shared by every connection.
pub(crate) struct ListenCtx {
    pub ingest: IngestConsumer,
    pub router: ArtifactStateRouter,
    pub scheduler: SchedulerHandle,
    pub shutdown: Arc<Notify>,
}

pub(crate) struct Listener {
    unix: UnixListener,
    ctx: Arc<ListenCtx>,
}

#[derive(Debug, Error)]
pub(crate) enum ConnectionError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

impl Listener {
    pub fn new(unix: UnixListener, ctx: Arc<ListenCtx>) -> Self {
        Self { unix, ctx }
    }

    /// Run the listener loop until cancelled, spawning a task per connection.
    pub async fn run(self, cancel: CancellationToken) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                result = self.unix.accept() => match result {
                    Ok((stream, _)) => {
                        let ctx = Arc::clone(&self.ctx);
                        tokio::spawn(async move {
                            let (reader, writer) = stream.into_split();
                            if let Err(e) = handle_connection(reader, writer, &ctx).await {
                                log_connection_error(e);
                            }
                        });
                    }
                    Err(e) => error!("Unix accept error: {}", e),
                },
            }
        }
        debug!("listener stopped");
    }
}

fn log_connection_error(e: ConnectionError) {
    match e {
        ConnectionError::Protocol(ProtocolError::ConnectionClosed) => {
            debug!("Client disconnected")
        }
        ConnectionError::Protocol(ProtocolError::Timeout) => {
            warn!("Connection timeout")
        }
        _ => error!("Connection error: {}", e),
    }
}

/// Serve one request. Races the request handler against client disconnect detection so that a
/// client giving up does not leave its handler running.
async fn handle_connection<R, W>(
    mut reader: R,
    mut writer: W,
    ctx: &ListenCtx,
) -> Result<(), ConnectionError>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let request = prov_wire::read_request(&mut reader, ipc_timeout()).await?;

    // Status lookups are polled, everything else is worth seeing
    if matches!(request, Request::Status { .. } | Request::Ping) {
        debug!(request = ?request, "received query");
    } else {
        info!(request = ?request, "received request");
    }

    let response = tokio::select! {
        response = handle_request(request, ctx) => response,
        _ = detect_client_disconnect(&mut reader) => {
            debug!("Client disconnected, dropping handler");
            return Ok(());
        }
    };

    debug!("Sending response: {:?}", response);
    prov_wire::write_response(&mut writer, &response, ipc_timeout()).await?;
    Ok(())
}

/// In the request-response protocol the client sends one request then
/// waits, so a read completing here means the client went away.
async fn detect_client_disconnect<R: AsyncRead + Unpin>(reader: &mut R) {
    let mut buf = [0u8; 1];
    let _ = reader.read(&mut buf).await;
}

async fn handle_request(request: Request, ctx: &ListenCtx) -> Response {
    match request {
        Request::Ping => Response::Pong,

        Request::Hello { version } => {
            if version != PROTOCOL_VERSION {
                warn!(client = %version, daemon = PROTOCOL_VERSION, "protocol version mismatch");
            }
            Response::Hello { version: PROTOCOL_VERSION.to_string() }
        }

        Request::Fact { fact } => facts::handle_fact(ctx, fact).await,

        Request::Track { coordinates } => facts::handle_track(ctx, coordinates).await,

        Request::Status { coordinates, version } => {
            facts::handle_status(ctx, coordinates, version).await
        }

        Request::Shutdown => {
            ctx.shutdown.notify_one();
            Response::ShuttingDown
        }
    }
}

#[cfg(test)]
#[path = "../listener_tests.rs"]
mod tests;
