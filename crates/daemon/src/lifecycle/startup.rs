// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon startup and initialization logic.

use std::io::Write;
use std::path::Path;
use std::time::Instant;

use fs2::FileExt;
use prov_adapters::{CliGit, OutboxPublisher};
use prov_engine::Engine;
use tokio::net::UnixListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::{Config, DaemonState, LifecycleError, StartupResult};

/// Start the daemon
pub async fn startup(
    config: &Config,
    cancel: CancellationToken,
) -> Result<StartupResult, LifecycleError> {
    match startup_inner(config, cancel).await {
        Ok(result) => Ok(result),
        Err(e) => {
            // a held lock means the socket and pid file are another daemon's
            if !matches!(e, LifecycleError::LockFailed(_)) {
                cleanup_on_failure(config);
            }
            Err(e)
        }
    }
}

async fn startup_inner(
    config: &Config,
    cancel: CancellationToken,
) -> Result<StartupResult, LifecycleError> {
    std::fs::create_dir_all(&config.state_dir)?;

    // Lock before anything else. Truncating on open would erase the pid
    // of a daemon that already holds it.
    let lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&config.lock_path)?;
    lock_file.try_lock_exclusive().map_err(LifecycleError::LockFailed)?;

    let mut lock_file = lock_file;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;
    let lock_file = lock_file;

    // checkouts from a previous run are never reused
    clear_scratch(&config.engine.scratch_dir)?;

    // bind last so a failed startup never leaves a reachable socket
    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)?;
    }
    let listener = UnixListener::bind(&config.socket_path)
        .map_err(|e| LifecycleError::BindFailed(config.socket_path.clone(), e))?;

    let publisher = OutboxPublisher::new(config.engine.outbox_path());
    let engine = Engine::start(config.engine.clone(), CliGit::new(), publisher, cancel);

    info!(
        socket = %config.socket_path.display(),
        pid = std::process::id(),
        "Daemon started"
    );

    Ok(StartupResult {
        daemon: DaemonState {
            config: config.clone(),
            lock_file,
            engine,
            start_time: Instant::now(),
        },
        listener,
    })
}

fn clear_scratch(scratch: &Path) -> Result<(), LifecycleError> {
    if scratch.exists() {
        match std::fs::remove_dir_all(scratch) {
            Ok(()) => info!(path = %scratch.display(), "cleared stale checkouts"),
            Err(e) => warn!(path = %scratch.display(), error = %e, "failed to clear stale checkouts"),
        }
    }
    std::fs::create_dir_all(scratch)?;
    Ok(())
}

fn cleanup_on_failure(config: &Config) {
    if config.socket_path.exists() {
        let _ = std::fs::remove_file(&config.socket_path);
    }
    if config.lock_path.exists() {
        let _ = std::fs::remove_file(&config.lock_path);
    }
}

#[cfg(test)]
#[path = "startup_tests.rs"]
mod tests;
