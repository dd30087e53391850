//! Shared fixtures for the specs.

use std::future::Future;
use std::path::Path;
use std::time::Duration;

pub use prov_adapters::{CliGit, FakePublisher, OutboxPublisher, Publication};
pub use prov_core::{ArtifactCoordinates, CommitSha, CommitStatusKind, RepoUrl};
pub use prov_engine::{Engine, EngineConfig, IngestOutcome, UpstreamFact};
pub use tempfile::TempDir;
pub use tokio_util::sync::CancellationToken;

pub fn git_available() -> bool {
    std::process::Command::new("git").arg("--version").output().is_ok()
}

fn git(dir: &Path, args: &[&str]) -> String {
    let output = std::process::Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(["-c", "user.name=Ada", "-c", "user.email=ada@example.com"])
        .args(["-c", "commit.gpgsign=false"])
        .args(args)
        .output()
        .unwrap();
    assert!(output.status.success(), "git {args:?}: {}", String::from_utf8_lossy(&output.stderr));
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// A source repository living in a temporary directory.
pub struct Upstream {
    dir: TempDir,
}

impl Upstream {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        git(dir.path(), &["init", "--quiet"]);
        Self { dir }
    }

    /// Commit (empty) and return the full commit id.
    pub fn commit(&self, message: &str) -> String {
        git(self.dir.path(), &["commit", "--quiet", "--allow-empty", "-m", message]);
        git(self.dir.path(), &["rev-parse", "HEAD"])
    }

    pub fn url(&self) -> String {
        self.dir.path().display().to_string()
    }
}

pub fn artifact() -> ArtifactCoordinates {
    ArtifactCoordinates::new("org.example", "widget")
}

/// Engine tuned for fast specs: short resync cadence and tight timeouts.
pub fn config(state: &TempDir) -> EngineConfig {
    EngineConfig::new(state.path())
        .resync_startup_delay(Duration::from_millis(50))
        .resync_interval(Duration::from_millis(200))
        .clone_timeout(Duration::from_secs(30))
        .resolve_timeout(Duration::from_secs(30))
        .resolver_pool_size(2)
}

/// Engine whose scheduler stays idle for the length of a spec.
pub fn quiet_config(state: &TempDir) -> EngineConfig {
    config(state).resync_startup_delay(Duration::from_secs(3600))
}

pub fn start(config: EngineConfig, publisher: &FakePublisher) -> Engine {
    Engine::start(config, CliGit::new(), publisher.clone(), CancellationToken::new())
}

pub async fn ingest(engine: &Engine, fact: UpstreamFact) -> IngestOutcome {
    engine.ingest().ingest(fact).await.unwrap()
}

pub async fn status(engine: &Engine, version: &str) -> Option<CommitStatusKind> {
    let handle = engine.router().handle(&artifact()).unwrap();
    handle.status(version).await.unwrap().map(|s| s.kind())
}

/// Poll `check` until it holds, failing after ten seconds.
pub async fn eventually<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for _ in 0..200 {
        if check().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("condition not reached");
}
