// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{parse_commit, GitAdapter, GitError, RawCommit};
use crate::subprocess::{run_with_timeout, GIT_CLONE_TIMEOUT, GIT_FETCH_TIMEOUT, GIT_READ_TIMEOUT};
use async_trait::async_trait;
use prov_core::{CommitSha, RepoUrl};
use std::path::Path;
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

/// Git adapter that shells out to the `git` binary.
///
/// Runs with prompts disabled and without system or global config, so a
/// remote asking for credentials fails fast instead of hanging.
#[derive(Clone, Debug)]
pub struct CliGit {
    clone_timeout: Duration,
    fetch_timeout: Duration,
    read_timeout: Duration,
}

impl Default for CliGit {
    fn default() -> Self {
        Self {
            clone_timeout: GIT_CLONE_TIMEOUT,
            fetch_timeout: GIT_FETCH_TIMEOUT,
            read_timeout: GIT_READ_TIMEOUT,
        }
    }
}

impl CliGit {
    pub fn new() -> Self {
        Self::default()
    }

    prov_core::setters! {
        set {
            clone_timeout: Duration,
            fetch_timeout: Duration,
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new("git");
        cmd.env("GIT_TERMINAL_PROMPT", "0")
            .env("GIT_CONFIG_NOSYSTEM", "1")
            .env("GIT_CONFIG_GLOBAL", "/dev/null")
            .env_remove("GIT_DIR")
            .env_remove("GIT_WORK_TREE");
        cmd
    }

    async fn run(
        &self,
        cmd: Command,
        timeout: Duration,
        description: &str,
    ) -> Result<Output, GitError> {
        let output = run_with_timeout(cmd, timeout, description).await.map_err(GitError::Spawn)?;
        if !output.status.success() {
            return Err(GitError::Failed {
                description: description.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output)
    }
}

#[async_trait]
impl GitAdapter for CliGit {
    async fn clone_repo(&self, url: &RepoUrl, dest: &Path) -> Result<(), GitError> {
        let mut cmd = self.command();
        cmd.args(["clone", "--quiet", "--no-single-branch", "--recurse-submodules", "--"])
            .arg(url.as_str())
            .arg(dest);
        tracing::debug!(repo = %url, dest = %dest.display(), "git clone");
        self.run(cmd, self.clone_timeout, "git clone").await?;
        Ok(())
    }

    /// Fetch every branch head and tag, not only those the clone tracks.
    async fn fetch(&self, checkout: &Path) -> Result<(), GitError> {
        let mut cmd = self.command();
        cmd.arg("-C").arg(checkout).args([
            "fetch",
            "--quiet",
            "--recurse-submodules=yes",
            "--tags",
            "--no-prune",
            "origin",
            "+refs/heads/*:refs/remotes/origin/*",
        ]);
        self.run(cmd, self.fetch_timeout, "git fetch").await?;
        Ok(())
    }

    async fn read_commit(&self, checkout: &Path, sha: &CommitSha) -> Result<RawCommit, GitError> {
        let mut cmd = self.command();
        cmd.arg("-C")
            .arg(checkout)
            .args(["rev-parse", "--quiet", "--verify"])
            .arg(format!("{}^{{commit}}", sha.as_str()));
        let output = match self.run(cmd, self.read_timeout, "git rev-parse").await {
            Ok(output) => output,
            Err(GitError::Failed { .. }) => return Err(GitError::NotFound(sha.to_string())),
            Err(e) => return Err(e),
        };
        let full_id = String::from_utf8_lossy(&output.stdout).trim().to_string();

        let mut cmd = self.command();
        cmd.arg("-C").arg(checkout).args(["cat-file", "commit"]).arg(&full_id);
        let output = self.run(cmd, self.read_timeout, "git cat-file").await?;

        parse_commit(&full_id, &String::from_utf8_lossy(&output.stdout))
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
