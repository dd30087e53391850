// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;
use tempfile::tempdir;

fn config(dir: &Path) -> Config {
    Config::at(dir.join("state"))
}

#[tokio::test]
#[serial]
async fn startup_binds_socket_and_writes_pid() {
    let dir = tempdir().unwrap();
    let config = config(dir.path());

    let result = startup(&config, CancellationToken::new()).await.unwrap();

    assert!(config.socket_path.exists());
    let pid = std::fs::read_to_string(&config.lock_path).unwrap();
    assert_eq!(pid.trim(), std::process::id().to_string());
    assert!(config.engine.scratch_dir.is_dir());

    result.daemon.shutdown().await;
}

#[tokio::test]
#[serial]
async fn startup_clears_orphaned_checkouts() {
    let dir = tempdir().unwrap();
    let config = config(dir.path());
    let orphan = config.engine.scratch_dir.join("prov-g-a-0000");
    std::fs::create_dir_all(&orphan).unwrap();
    std::fs::write(orphan.join("HEAD"), "ref: refs/heads/main\n").unwrap();

    let result = startup(&config, CancellationToken::new()).await.unwrap();

    assert!(!orphan.exists());
    assert!(config.engine.scratch_dir.is_dir());
    result.daemon.shutdown().await;
}

#[tokio::test]
#[serial]
async fn second_daemon_fails_without_touching_first() {
    let dir = tempdir().unwrap();
    let config = config(dir.path());
    let first = startup(&config, CancellationToken::new()).await.unwrap();

    let second = startup(&config, CancellationToken::new()).await;

    assert!(matches!(second, Err(LifecycleError::LockFailed(_))));
    assert!(config.socket_path.exists(), "running daemon keeps its socket");
    let pid = std::fs::read_to_string(&config.lock_path).unwrap();
    assert_eq!(pid.trim(), std::process::id().to_string());

    first.daemon.shutdown().await;
}

#[tokio::test]
#[serial]
async fn stale_socket_is_replaced() {
    let dir = tempdir().unwrap();
    let config = config(dir.path());
    std::fs::create_dir_all(&config.state_dir).unwrap();
    std::fs::write(&config.socket_path, b"").unwrap();

    let result = startup(&config, CancellationToken::new()).await.unwrap();

    let meta = std::fs::symlink_metadata(&config.socket_path).unwrap();
    assert!(!meta.is_file(), "stale file replaced by a socket");
    result.daemon.shutdown().await;
}

#[tokio::test]
#[serial]
async fn shutdown_removes_socket_and_pid() {
    let dir = tempdir().unwrap();
    let config = config(dir.path());
    let result = startup(&config, CancellationToken::new()).await.unwrap();

    result.daemon.shutdown().await;

    assert!(!config.socket_path.exists());
    assert!(!config.lock_path.exists());

    // the lock is free again
    let again = startup(&config, CancellationToken::new()).await.unwrap();
    again.daemon.shutdown().await;
}
