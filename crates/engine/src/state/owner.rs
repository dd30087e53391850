// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The single writer for one artifact's git state.

use crate::error::EngineError;
use prov_core::{ArtifactCoordinates, CommitDetails, CommitSha, CommitStatus, Event, RepoUrl};
use prov_storage::{ArtifactGitState, Partition, UnresolvedWork};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub(crate) type Reply<T> = oneshot::Sender<Result<T, EngineError>>;

/// Commands accepted by an artifact owner.
pub(crate) enum Command {
    RegisterArtifact { reply: Reply<bool> },
    RegisterRepository { repository: RepoUrl, reply: Reply<bool> },
    RegisterVersion { version: String, reply: Reply<bool> },
    RegisterRawCommit { version: String, sha: CommitSha, reply: Reply<bool> },
    MarkResolved {
        version: String,
        repository: RepoUrl,
        details: Box<CommitDetails>,
        reply: Reply<bool>,
    },
    MarkMissing { version: String, sha: CommitSha, reply: Reply<bool> },
    GetRepositories { reply: Reply<Option<Vec<RepoUrl>>> },
    GetUnresolvedWork { reply: Reply<UnresolvedWork> },
    GetStatus { version: String, reply: Reply<Option<CommitStatus>> },
    GetState { reply: Reply<ArtifactGitState> },
}

impl Command {
    /// The event a mutating command implies, paired with its reply.
    fn into_mutation(self, coords: &ArtifactCoordinates) -> Result<(Event, Reply<bool>), Self> {
        match self {
            Command::RegisterArtifact { reply } => {
                Ok((Event::ArtifactRegistered { coordinates: coords.clone() }, reply))
            }
            Command::RegisterRepository { repository, reply } => {
                Ok((Event::RepositoryRegistered { repository }, reply))
            }
            Command::RegisterVersion { version, reply } => {
                Ok((Event::VersionRegistered { version }, reply))
            }
            Command::RegisterRawCommit { version, sha, reply } => {
                Ok((Event::CommitExtracted { version, sha }, reply))
            }
            Command::MarkResolved { version, repository, details, reply } => {
                Ok((Event::CommitResolved { version, repository, details }, reply))
            }
            Command::MarkMissing { version, sha, reply } => {
                Ok((Event::CommitUnresolvable { version, sha }, reply))
            }
            query => Err(query),
        }
    }
}

/// Owner loop: serializes every command for one artifact.
///
/// Mutations are persisted before they are applied and before the caller
/// hears back. Events that would not change the state are not persisted and
/// reply `false`.
pub(crate) async fn run_owner(
    mut partition: Partition,
    mut rx: mpsc::Receiver<Command>,
    batch_cap: usize,
    cancel: CancellationToken,
) {
    let coords = partition.coordinates().clone();
    debug!(coords = %coords, phase = %partition.state().phase(), "artifact owner started");

    loop {
        let command = tokio::select! {
            _ = cancel.cancelled() => break,
            command = rx.recv() => match command {
                Some(command) => command,
                None => break,
            },
        };

        match command.into_mutation(&coords) {
            Ok((event, reply)) => {
                let result = if partition.state().changes(&event) {
                    let summary = event.log_summary();
                    match partition.persist(std::slice::from_ref(&event)) {
                        Ok(()) => {
                            info!(coords = %coords, "{summary}");
                            Ok(true)
                        }
                        Err(e) => {
                            warn!(coords = %coords, error = %e, "failed to persist {summary}");
                            Err(EngineError::from(e))
                        }
                    }
                } else {
                    Ok(false)
                };
                let _ = reply.send(result);
            }
            Err(query) => answer(partition.state(), query, batch_cap),
        }
    }

    if partition.is_dirty() {
        if let Err(e) = partition.checkpoint() {
            warn!(coords = %coords, error = %e, "final checkpoint failed");
        }
    }
    debug!(coords = %coords, "artifact owner stopped");
}

fn answer(state: &ArtifactGitState, query: Command, batch_cap: usize) {
    match query {
        Command::GetRepositories { reply } => {
            let repos = (!state.repositories.is_empty())
                .then(|| state.repositories.iter().cloned().collect());
            let _ = reply.send(Ok(repos));
        }
        Command::GetUnresolvedWork { reply } => {
            let _ = reply.send(Ok(state.unresolved_work(batch_cap)));
        }
        Command::GetStatus { version, reply } => {
            let _ = reply.send(Ok(state.status(&version).cloned()));
        }
        Command::GetState { reply } => {
            let _ = reply.send(Ok(state.clone()));
        }
        Command::RegisterArtifact { .. }
        | Command::RegisterRepository { .. }
        | Command::RegisterVersion { .. }
        | Command::RegisterRawCommit { .. }
        | Command::MarkResolved { .. }
        | Command::MarkMissing { .. } => {}
    }
}
