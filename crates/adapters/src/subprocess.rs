// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess execution with timeouts

use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

/// Timeout for one `git clone` of one repository.
pub const GIT_CLONE_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Timeout for `git fetch` in an existing checkout.
pub const GIT_FETCH_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Timeout for local object reads (`rev-parse`, `cat-file`).
pub const GIT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Run a command to completion, killing it if it outlives `timeout`.
///
/// Errors carry `description` so callers can surface them directly.
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    description: &str,
) -> Result<Output, String> {
    cmd.kill_on_drop(true).stdin(std::process::Stdio::null());
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(format!("{description} failed to run: {e}")),
        Err(_) => Err(format!("{description} timed out after {}s", timeout.as_secs())),
    }
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
