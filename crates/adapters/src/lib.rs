// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! prov-adapters: git and publishing I/O behind async traits

pub mod git;
pub mod publish;
pub mod subprocess;

pub use git::{CliGit, GitAdapter, GitError, Ident, RawCommit};
pub use publish::{OutboxPublisher, Publication, PublishAdapter, PublishError};

#[cfg(any(test, feature = "test-support"))]
pub use git::{FakeGit, GitCall};
#[cfg(any(test, feature = "test-support"))]
pub use publish::FakePublisher;
