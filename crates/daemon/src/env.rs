// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;
use std::time::Duration;

use prov_engine::EngineConfig;

use crate::lifecycle::LifecycleError;

/// Resolve state directory: PROV_STATE_DIR > XDG_STATE_HOME/prov > ~/.local/state/prov
pub fn state_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var("PROV_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("prov"));
    }
    let home = dirs::home_dir().ok_or(LifecycleError::NoStateDir)?;
    Ok(home.join(".local/state/prov"))
}

/// Checkout scratch directory override
pub fn scratch_dir() -> Option<PathBuf> {
    std::env::var("PROV_SCRATCH_DIR").ok().filter(|s| !s.is_empty()).map(PathBuf::from)
}

/// Default IPC timeout
pub fn ipc_timeout() -> Duration {
    millis("PROV_IPC_TIMEOUT_MS").unwrap_or(Duration::from_secs(5))
}

/// Log filter directives (default `info`)
pub fn log_filter() -> String {
    std::env::var("PROV_LOG").ok().filter(|s| !s.is_empty()).unwrap_or_else(|| "info".to_string())
}

/// Engine tunables, starting from the defaults and applying any
/// `PROV_*` overrides.
pub fn engine_config(state_dir: PathBuf) -> EngineConfig {
    let mut config = EngineConfig::new(state_dir);
    if let Some(dir) = scratch_dir() {
        config = config.scratch_dir(dir);
    }
    if let Some(d) = millis("PROV_CLONE_TIMEOUT_MS") {
        config = config.clone_timeout(d);
    }
    if let Some(d) = millis("PROV_RESOLVE_TIMEOUT_MS") {
        config = config.resolve_timeout(d);
    }
    if let Some(d) = millis("PROV_QUERY_TIMEOUT_MS") {
        config = config.query_timeout(d);
    }
    if let Some(d) = millis("PROV_RESYNC_INTERVAL_MS") {
        config = config.resync_interval(d);
    }
    if let Some(d) = millis("PROV_RESYNC_STARTUP_DELAY_MS") {
        config = config.resync_startup_delay(d);
    }
    if let Some(n) = count("PROV_RESYNC_PARALLELISM") {
        config = config.resync_parallelism(n);
    }
    if let Some(n) = count("PROV_UNRESOLVED_BATCH") {
        config = config.unresolved_batch(n);
    }
    if let Some(n) = count("PROV_SNAPSHOT_EVERY") {
        config = config.snapshot_every(n as u64);
    }
    if let Some(n) = count("PROV_RESOLVER_POOL_SIZE") {
        config = config.resolver_pool_size(n);
    }
    config
}

fn millis(var: &str) -> Option<Duration> {
    std::env::var(var).ok().and_then(|s| s.parse::<u64>().ok()).map(Duration::from_millis)
}

/// Positive integer; zero and garbage fall back to the default.
fn count(var: &str) -> Option<usize> {
    std::env::var(var).ok().and_then(|s| s.parse::<usize>().ok()).filter(|n| *n > 0)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
