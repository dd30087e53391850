// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Restart-with-backoff supervision for long-lived workers.
//!
//! Each worker reads from a [`Mailbox`] that the supervisor keeps alive
//! across incarnations. A restarted worker starts with empty ephemeral
//! state but still sees every message that was not yet received.

use crate::error::EngineError;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Receiving half shared by every incarnation of one worker.
pub type Mailbox<T> = Arc<Mutex<mpsc::Receiver<T>>>;

pub fn mailbox<T>(capacity: usize) -> (mpsc::Sender<T>, Mailbox<T>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (tx, Arc::new(Mutex::new(rx)))
}

/// Exponential backoff between restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub min: Duration,
    pub max: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self { min: Duration::from_millis(100), max: Duration::from_secs(40) }
    }
}

impl BackoffPolicy {
    /// Delay after `delay`, doubling up to the cap.
    pub fn next(&self, delay: Duration) -> Duration {
        delay.saturating_mul(2).clamp(self.min, self.max)
    }
}

/// Run `factory()` until it returns `Ok`, restarting it with backoff when it
/// fails or panics. Stops without restarting once `cancel` fires.
///
/// A run that lasted longer than `policy.max` resets the delay to `policy.min`.
pub fn supervise<F, Fut>(
    name: &'static str,
    policy: BackoffPolicy,
    cancel: CancellationToken,
    mut factory: F,
) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), EngineError>> + Send + 'static,
{
    tokio::spawn(async move {
        let mut delay = policy.min;
        let mut restarts = 0u32;
        loop {
            let started = Instant::now();
            let outcome = tokio::spawn(factory()).await;

            if cancel.is_cancelled() {
                info!(worker = name, "worker stopped");
                return;
            }
            match outcome {
                Ok(Ok(())) => {
                    info!(worker = name, "worker finished");
                    return;
                }
                Ok(Err(e)) => warn!(worker = name, error = %e, "worker failed"),
                Err(e) => error!(worker = name, error = %e, "worker panicked"),
            }

            if started.elapsed() > policy.max {
                delay = policy.min;
            }
            restarts += 1;
            info!(worker = name, restarts, delay_ms = delay.as_millis() as u64, "restarting worker");

            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }
            delay = policy.next(delay);
        }
    })
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
