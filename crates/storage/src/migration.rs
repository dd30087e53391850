// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Snapshot schema migrations over raw JSON.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("snapshot version {0} is newer than supported ({1})")]
    TooNew(u32, u32),
    #[error("no migration path from version {0} to {1}")]
    NoPath(u32, u32),
    #[error("snapshot has no schema version")]
    MissingVersion,
}

/// One step from `source_version` to `target_version`.
pub(crate) trait Migration: Send + Sync {
    fn source_version(&self) -> u32;
    fn target_version(&self) -> u32;
    fn migrate(&self, snapshot: &mut Value) -> Result<(), MigrationError>;
}

/// Ordered set of known migrations.
///
/// Version 1 is the only schema so far and nothing is registered. Until a
/// version 2 exists, loading only checks the version field: snapshots from
/// a newer schema are rejected and a missing field is an error. A schema
/// change adds its step to `new`.
#[derive(Default)]
pub(crate) struct MigrationRegistry {
    pub(crate) migrations: Vec<Box<dyn Migration>>,
}

impl MigrationRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Migrate a raw snapshot up to `target`, rewriting its `"v"` field.
    pub(crate) fn migrate_to(&self, mut snapshot: Value, target: u32) -> Result<Value, MigrationError> {
        let mut version = snapshot
            .get("v")
            .and_then(Value::as_u64)
            .and_then(|v| u32::try_from(v).ok())
            .ok_or(MigrationError::MissingVersion)?;

        if version > target {
            return Err(MigrationError::TooNew(version, target));
        }

        while version < target {
            let step = self
                .migrations
                .iter()
                .find(|m| m.source_version() == version)
                .ok_or(MigrationError::NoPath(version, target))?;
            step.migrate(&mut snapshot)?;
            version = step.target_version();
            if let Some(obj) = snapshot.as_object_mut() {
                obj.insert("v".into(), version.into());
            }
        }
        Ok(snapshot)
    }
}

#[cfg(test)]
#[path = "migration_tests.rs"]
mod tests;
