// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup and shutdown.

mod startup;
pub use startup::startup;

use std::fs::File;
use std::path::PathBuf;
use std::time::Instant;

use prov_engine::{Engine, EngineConfig};
use thiserror::Error;
use tokio::net::UnixListener;
use tracing::{info, warn};

use crate::env::{engine_config, state_dir};

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Root state directory (e.g. ~/.local/state/prov)
    pub state_dir: PathBuf,
    /// Path to Unix socket
    pub socket_path: PathBuf,
    /// Path to lock/PID file
    pub lock_path: PathBuf,
    /// Path to daemon log file
    pub log_path: PathBuf,
    /// Pipeline tunables, including the checkout scratch directory
    pub engine: EngineConfig,
}

impl Config {
    /// Load configuration for the user-level daemon.
    ///
    /// Uses fixed paths under `~/.local/state/prov/` (or `$XDG_STATE_HOME/prov/`),
    /// with engine tunables taken from `PROV_*` overrides.
    pub fn load() -> Result<Self, LifecycleError> {
        Ok(Self::at(state_dir()?))
    }

    pub fn at(state_dir: PathBuf) -> Self {
        Self {
            socket_path: state_dir.join("provd.sock"),
            lock_path: state_dir.join("provd.pid"),
            log_path: state_dir.join("provd.log"),
            engine: engine_config(state_dir.clone()),
            state_dir,
        }
    }
}

/// Daemon state during operation.
pub struct DaemonState {
    pub config: Config,
    // held for the exclusive lock, released on drop
    lock_file: File,
    pub engine: Engine,
    pub start_time: Instant,
}

/// Result of daemon startup: the running daemon and the socket to serve.
pub struct StartupResult {
    pub daemon: DaemonState,
    pub listener: UnixListener,
}

impl DaemonState {
    /// Shutdown the daemon gracefully.
    ///
    /// Stops every engine worker first so that owners checkpoint their
    /// partitions and resolvers remove their checkouts, then removes the
    /// socket and PID files. The lock is released when `self` drops.
    pub async fn shutdown(self) {
        info!("Shutting down daemon...");
        let DaemonState { config, lock_file, engine, start_time } = self;

        engine.shutdown().await;

        if config.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&config.socket_path) {
                warn!("Failed to remove socket file: {}", e);
            }
        }
        if config.lock_path.exists() {
            if let Err(e) = std::fs::remove_file(&config.lock_path) {
                warn!("Failed to remove PID file: {}", e);
            }
        }

        drop(lock_file);
        info!(uptime_secs = start_time.elapsed().as_secs(), "Daemon shutdown complete");
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Could not determine state directory")]
    NoStateDir,

    #[error("Failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("Failed to bind socket at {0}: {1}")]
    BindFailed(PathBuf, std::io::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
