// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! provd: resolves artifact version shas into commit metadata

mod env;
mod lifecycle;
mod listener;
mod logging;

use std::process::ExitCode;
use std::sync::Arc;

use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::lifecycle::{startup, Config, LifecycleError};
use crate::listener::{ListenCtx, Listener};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("provd: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), LifecycleError> {
    let config = Config::load()?;
    let _log_guard = logging::init(&config.log_path)?;

    let cancel = CancellationToken::new();
    let lifecycle::StartupResult { daemon, listener } = startup(&config, cancel.clone()).await?;

    let shutdown = Arc::new(Notify::new());
    let ctx = Arc::new(ListenCtx {
        ingest: daemon.engine.ingest().clone(),
        router: daemon.engine.router().clone(),
        scheduler: daemon.engine.scheduler().clone(),
        shutdown: Arc::clone(&shutdown),
    });
    let listener_task = tokio::spawn(Listener::new(listener, ctx).run(cancel.child_token()));

    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("received interrupt"),
        _ = sigterm.recv() => info!("received SIGTERM"),
        _ = shutdown.notified() => info!("shutdown requested"),
    }

    cancel.cancel();
    let _ = listener_task.await;
    daemon.shutdown().await;
    Ok(())
}
