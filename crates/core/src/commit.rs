// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Commit identifiers and resolved commit metadata.

use crate::repo::RepoUrl;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitShaError {
    #[error("commit id '{0}' must be 4-40 or 64 hex characters")]
    Length(String),
    #[error("commit id '{0}' is not hexadecimal")]
    NotHex(String),
}

/// A commit id, full or abbreviated, normalized to lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommitSha(String);

impl CommitSha {
    pub fn parse(raw: &str) -> Result<Self, CommitShaError> {
        let trimmed = raw.trim();
        let len = trimmed.len();
        if !((4..=40).contains(&len) || len == 64) {
            return Err(CommitShaError::Length(trimmed.to_string()));
        }
        if !trimmed.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CommitShaError::NotHex(trimmed.to_string()));
        }
        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when `full` (a complete id) starts with this id.
    pub fn matches(&self, full: &str) -> bool {
        full.get(..self.0.len()).is_some_and(|prefix| prefix.eq_ignore_ascii_case(&self.0))
    }
}

impl fmt::Display for CommitSha {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CommitSha {
    type Err = CommitShaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CommitSha {
    type Error = CommitShaError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<CommitSha> for String {
    fn from(sha: CommitSha) -> Self {
        sha.0
    }
}

/// A commit author or committer identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub email: String,
}

impl Person {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self { name: name.into(), email: email.into() }
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

/// Metadata for one resolved commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitDetails {
    pub short_message: String,
    pub full_message: String,
    /// Full commit id as reported by the repository.
    pub commit_id: String,
    pub author: Person,
    pub committer: Person,
    /// Canonical web link, `{repo}/commit/{sha}`.
    pub link: String,
    /// Commit time in the committer's UTC offset.
    pub commit_date: DateTime<FixedOffset>,
}

impl CommitDetails {
    /// Build the canonical web link for a commit in `repo`.
    pub fn link_for(repo: &RepoUrl, commit_id: &str) -> String {
        format!("{}/commit/{}", repo.web_base(), commit_id)
    }
}

crate::builder! {
    pub struct CommitDetailsBuilder => CommitDetails {
        into {
            short_message: String = "Fix the build",
            full_message: String = "Fix the build\n\nPin the toolchain.\n",
            commit_id: String = "0123456789abcdef0123456789abcdef01234567",
            link: String = "https://example.com/repo/commit/0123456789abcdef0123456789abcdef01234567",
        }
        set {
            author: Person = Person::new("Ada", "ada@example.com"),
            committer: Person = Person::new("Grace", "grace@example.com"),
            commit_date: DateTime<FixedOffset> = DateTime::<chrono::Utc>::default().fixed_offset(),
        }
    }
}

#[cfg(test)]
#[path = "commit_tests.rs"]
mod tests;
