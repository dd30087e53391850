// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only event journal for one partition.
//!
//! Each line is a JSON `{"seq": N, "event": {...}}` terminated by `\n`. An
//! entry counts as written only once its newline is on disk, so a torn final
//! line left by a crash is dropped on open. Anything unreadable before the
//! final line is reported as corruption.

use prov_core::Event;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("corrupt journal {path} at line {line}")]
    Corrupt { path: PathBuf, line: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub seq: u64,
    pub event: Event,
}

pub struct Journal {
    path: PathBuf,
    file: File,
    write_buf: Vec<u8>,
    write_seq: u64,
    flushed_seq: u64,
    /// File length covered by complete, flushed entries.
    committed_len: u64,
}

impl Journal {
    /// Open or create the journal at `path`.
    ///
    /// Sequence numbers continue from the last entry on disk, or from
    /// `min_seq` when that is higher (a snapshot covers entries already
    /// truncated away).
    pub fn open(path: &Path, min_seq: u64) -> Result<Self, JournalError> {
        let (entries, valid_len) = match fs::read(path) {
            Ok(bytes) => scan(path, &bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => (Vec::new(), 0),
            Err(e) => return Err(e.into()),
        };

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let on_disk = file.metadata()?.len();
        if on_disk > valid_len {
            warn!(
                path = %path.display(),
                dropped_bytes = on_disk - valid_len,
                "dropping torn journal tail"
            );
            file.set_len(valid_len)?;
        }

        let last_seq = entries.last().map(|e| e.seq).unwrap_or(0).max(min_seq);
        Ok(Self {
            path: path.to_path_buf(),
            file,
            write_buf: Vec::new(),
            write_seq: last_seq,
            flushed_seq: last_seq,
            committed_len: valid_len,
        })
    }

    /// Buffer an event and return its sequence number. Not durable until
    /// [`Journal::flush`].
    pub fn append(&mut self, event: &Event) -> Result<u64, JournalError> {
        let seq = self.write_seq + 1;
        let entry = JournalEntry { seq, event: event.clone() };
        serde_json::to_writer(&mut self.write_buf, &entry)?;
        self.write_buf.push(b'\n');
        self.write_seq = seq;
        Ok(seq)
    }

    /// Write buffered entries and sync them to disk.
    ///
    /// Bytes past the last flushed entry, left by a write that failed
    /// partway, are cut off first so that new entries start on a fresh line.
    pub fn flush(&mut self) -> Result<(), JournalError> {
        if self.write_buf.is_empty() {
            return Ok(());
        }
        let on_disk = self.file.metadata()?.len();
        if on_disk > self.committed_len {
            warn!(
                path = %self.path.display(),
                dropped_bytes = on_disk - self.committed_len,
                "dropping partial journal write"
            );
            self.file.set_len(self.committed_len)?;
        }
        self.file.write_all(&self.write_buf)?;
        self.file.sync_data()?;
        self.committed_len += self.write_buf.len() as u64;
        self.write_buf.clear();
        self.flushed_seq = self.write_seq;
        Ok(())
    }

    /// Forget buffered entries that were never flushed.
    pub fn discard_pending(&mut self) {
        self.write_buf.clear();
        self.write_seq = self.flushed_seq;
    }

    /// Flushed entries with `seq > after`, in order.
    pub fn entries_after(&self, after: u64) -> Result<Vec<JournalEntry>, JournalError> {
        let bytes = fs::read(&self.path)?;
        let (entries, _) = scan(&self.path, &bytes)?;
        Ok(entries.into_iter().filter(|e| e.seq > after).collect())
    }

    /// Drop every entry with `seq < keep_from`, rewriting the file atomically.
    pub fn truncate_before(&mut self, keep_from: u64) -> Result<(), JournalError> {
        self.flush()?;
        let kept = self.entries_after(keep_from.saturating_sub(1))?;

        let tmp = self.path.with_extension("jsonl.tmp");
        let len;
        {
            let mut out = File::create(&tmp)?;
            let mut buf = Vec::new();
            for entry in &kept {
                serde_json::to_writer(&mut buf, entry)?;
                buf.push(b'\n');
            }
            out.write_all(&buf)?;
            out.sync_all()?;
            len = buf.len() as u64;
        }
        fs::rename(&tmp, &self.path)?;
        self.file = OpenOptions::new().append(true).open(&self.path)?;
        self.committed_len = len;
        Ok(())
    }

    pub fn write_seq(&self) -> u64 {
        self.write_seq
    }

    pub fn needs_flush(&self) -> bool {
        !self.write_buf.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Parse complete lines, returning the entries and the byte length they span.
fn scan(path: &Path, bytes: &[u8]) -> Result<(Vec<JournalEntry>, u64), JournalError> {
    let mut entries: Vec<JournalEntry> = Vec::new();
    let mut offset = 0usize;
    let mut line = 0usize;

    while offset < bytes.len() {
        line += 1;
        let rest = &bytes[offset..];
        let Some(newline) = rest.iter().position(|b| *b == b'\n') else {
            // no terminator: torn write
            break;
        };
        let raw = &rest[..newline];
        let next = offset + newline + 1;
        let is_last = next >= bytes.len();

        if raw.iter().all(u8::is_ascii_whitespace) {
            offset = next;
            continue;
        }

        match serde_json::from_slice::<JournalEntry>(raw) {
            Ok(entry) if entries.last().map_or(true, |prev| entry.seq > prev.seq) => {
                entries.push(entry);
                offset = next;
            }
            _ if is_last => break,
            _ => return Err(JournalError::Corrupt { path: path.to_path_buf(), line }),
        }
    }

    Ok((entries, offset as u64))
}

#[cfg(test)]
#[path = "journal_tests.rs"]
mod tests;
