// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! prov-core: domain vocabulary for git commit provenance tracking

pub mod macros;

pub mod commit;
pub mod coordinates;
pub mod event;
pub mod id;
pub mod repo;
pub mod status;
pub mod version;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use commit::{CommitDetails, CommitSha, CommitShaError, Person};
#[cfg(any(test, feature = "test-support"))]
pub use commit::CommitDetailsBuilder;
pub use coordinates::{ArtifactCoordinates, CoordinatesError, MavenCoordinates};
pub use event::Event;
pub use id::{short, CloneSessionId, ResolveRequestId};
pub use repo::{RepoUrl, RepoUrlError};
pub use status::{CommitStatus, CommitStatusKind};
pub use version::MavenVersion;
