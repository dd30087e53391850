// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Remote repository locations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepoUrlError {
    #[error("repository url is empty")]
    Empty,
    #[error("repository url contains whitespace: '{0}'")]
    Whitespace(String),
    #[error("repository url must not start with '-': '{0}'")]
    LeadingDash(String),
}

/// A candidate remote for an artifact's sources.
///
/// Stored trimmed and without trailing `/`; otherwise compared verbatim, so
/// `https://h/r` and `https://h/r.git` are distinct repositories.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RepoUrl(String);

impl RepoUrl {
    pub fn parse(raw: &str) -> Result<Self, RepoUrlError> {
        let trimmed = raw.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(RepoUrlError::Empty);
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(RepoUrlError::Whitespace(trimmed.to_string()));
        }
        // git would read a leading dash as an option
        if trimmed.starts_with('-') {
            return Err(RepoUrlError::LeadingDash(trimmed.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The browsable base of the repository (trailing `.git` removed).
    pub fn web_base(&self) -> &str {
        self.0.strip_suffix(".git").unwrap_or(&self.0)
    }
}

impl fmt::Display for RepoUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RepoUrl {
    type Err = RepoUrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RepoUrl {
    type Error = RepoUrlError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<RepoUrl> for String {
    fn from(url: RepoUrl) -> Self {
        url.0
    }
}

#[cfg(test)]
#[path = "repo_tests.rs"]
mod tests;
