// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parsing of raw `git cat-file commit` output.

use super::GitError;
use chrono::{DateTime, FixedOffset};
use prov_core::{CommitDetails, Person, RepoUrl};

/// A signature line: who, and when in their own offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
    pub email: String,
    pub time: DateTime<FixedOffset>,
}

impl Ident {
    pub fn person(&self) -> Person {
        Person::new(self.name.clone(), self.email.clone())
    }
}

/// A commit object as stored by git.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCommit {
    pub id: String,
    pub tree: String,
    pub parents: Vec<String>,
    pub author: Ident,
    pub committer: Ident,
    pub message: String,
}

impl RawCommit {
    /// First paragraph of the message, folded onto one line.
    pub fn short_message(&self) -> String {
        let paragraph = self.message.trim_start().split("\n\n").next().unwrap_or_default();
        paragraph.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Commit metadata as found in `repository`.
    pub fn details(&self, repository: &RepoUrl) -> CommitDetails {
        CommitDetails {
            short_message: self.short_message(),
            full_message: self.message.clone(),
            commit_id: self.id.clone(),
            author: self.author.person(),
            committer: self.committer.person(),
            link: CommitDetails::link_for(repository, &self.id),
            commit_date: self.committer.time,
        }
    }
}

/// Parse the body of `git cat-file commit <id>`.
///
/// Headers run until the first blank line; lines starting with a space
/// continue the previous header (signatures, mergetags) and are skipped.
pub fn parse_commit(id: &str, body: &str) -> Result<RawCommit, GitError> {
    let (headers, message) = match body.split_once("\n\n") {
        Some((headers, message)) => (headers, message),
        None => (body.trim_end_matches('\n'), ""),
    };

    let mut tree = None;
    let mut parents = Vec::new();
    let mut author = None;
    let mut committer = None;

    for line in headers.lines() {
        if line.starts_with(' ') {
            continue;
        }
        let (key, value) = line.split_once(' ').unwrap_or((line, ""));
        match key {
            "tree" => tree = Some(value.to_string()),
            "parent" => parents.push(value.to_string()),
            "author" => author = Some(parse_ident(value)?),
            "committer" => committer = Some(parse_ident(value)?),
            _ => {}
        }
    }

    Ok(RawCommit {
        id: id.to_string(),
        tree: tree.ok_or_else(|| GitError::Parse(format!("{id}: missing tree")))?,
        parents,
        author: author.ok_or_else(|| GitError::Parse(format!("{id}: missing author")))?,
        committer: committer.ok_or_else(|| GitError::Parse(format!("{id}: missing committer")))?,
        message: message.to_string(),
    })
}

/// Parse `Name <email> <epoch> <+hhmm>`.
fn parse_ident(value: &str) -> Result<Ident, GitError> {
    let bad = || GitError::Parse(format!("bad ident line '{value}'"));

    let open = value.find('<').ok_or_else(bad)?;
    let close = value[open..].find('>').map(|i| open + i).ok_or_else(bad)?;
    let name = value[..open].trim().to_string();
    let email = value[open + 1..close].to_string();

    let mut when = value[close + 1..].split_whitespace();
    let epoch: i64 = when.next().and_then(|s| s.parse().ok()).ok_or_else(bad)?;
    let offset = when.next().and_then(parse_offset).ok_or_else(bad)?;
    let time = DateTime::from_timestamp(epoch, 0).ok_or_else(bad)?.with_timezone(&offset);

    Ok(Ident { name, email, time })
}

/// Parse `+hhmm` / `-hhmm` into an offset.
fn parse_offset(raw: &str) -> Option<FixedOffset> {
    let sign = match raw.get(..1)? {
        "+" => 1,
        "-" => -1,
        _ => return None,
    };
    let digits = raw.get(1..)?;
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

#[cfg(test)]
#[path = "parse_tests.rs"]
mod tests;
