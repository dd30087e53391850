// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

#[test]
fn same_version_is_noop() {
    let v1 = json!({"v": 1, "seq": 1, "state": {}});
    let result = MigrationRegistry::new().migrate_to(v1.clone(), 1).unwrap();
    assert_eq!(result, v1);
}

#[test]
fn too_new_is_rejected() {
    let v99 = json!({"v": 99, "seq": 1, "state": {}});
    let err = MigrationRegistry::new().migrate_to(v99, 1).unwrap_err();
    assert!(matches!(err, MigrationError::TooNew(99, 1)));
    assert_eq!(err.to_string(), "snapshot version 99 is newer than supported (1)");
}

#[test]
fn missing_version_is_rejected() {
    let raw = json!({"seq": 1, "state": {}});
    assert!(matches!(
        MigrationRegistry::new().migrate_to(raw, 1),
        Err(MigrationError::MissingVersion)
    ));
}

#[test]
fn no_path_is_rejected() {
    let v1 = json!({"v": 1, "seq": 1, "state": {}});
    assert!(matches!(
        MigrationRegistry::new().migrate_to(v1, 2),
        Err(MigrationError::NoPath(1, 2))
    ));
}

struct AddCoordinates;

impl Migration for AddCoordinates {
    fn source_version(&self) -> u32 {
        1
    }
    fn target_version(&self) -> u32 {
        2
    }
    fn migrate(&self, snapshot: &mut Value) -> Result<(), MigrationError> {
        if let Some(obj) = snapshot.as_object_mut() {
            obj.insert("coordinates".into(), json!({"group_id": "g", "artifact_id": "a"}));
        }
        Ok(())
    }
}

#[test]
fn migrations_chain_and_bump_version() {
    let mut registry = MigrationRegistry::new();
    registry.migrations.push(Box::new(AddCoordinates));

    let v1 = json!({"v": 1, "seq": 42, "state": {}});
    let result = registry.migrate_to(v1, 2).unwrap();

    assert_eq!(result["v"], 2);
    assert_eq!(result["seq"], 42);
    assert_eq!(result["coordinates"]["artifact_id"], "a");
}
