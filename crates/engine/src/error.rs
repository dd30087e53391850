// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use prov_storage::StoreError;
use thiserror::Error;

/// Errors crossing worker boundaries
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
    #[error("{0} timed out")]
    Timeout(&'static str),
    #[error("{0} is not running")]
    Unavailable(&'static str),
    #[error("{0}")]
    Io(#[from] std::io::Error),
}
