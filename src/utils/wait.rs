//! Wait for the client manifest before the server phase starts.
//!
//! The two compilation phases share no memory; the manifest file written by
//! the client phase is the only handshake between them. This module polls for
//! it, behind [`ArtifactStore`] so tests can swap the filesystem for memory.
//!
//! ```text
//! client phase ──► manifest written
//!                        │
//!      wait_for_artifact ┴─ exists? ── yes ──► release (once)
//!                           │ no
//!                           ├─ aborted?  ──► BuildError::Aborted
//!                           ├─ timed out? ─► BuildError::Timeout
//!                           └─ sleep(poll) and check again
//! ```

use crate::build::BuildError;
use crate::config::ConfigError;
use crate::utils::abort::AbortSignal;
use std::{
    path::Path,
    thread,
    time::{Duration, Instant},
};

/// Where build artifacts are looked up. Only existence matters.
pub trait ArtifactStore: Sync {
    fn exists(&self, path: &Path) -> bool;
}

/// Artifacts on the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStore;

impl ArtifactStore for FsStore {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// Poll interval and timeout for [`wait_for_artifact`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarrierConfig {
    poll_interval: Duration,
    timeout: Duration,
}

impl BarrierConfig {
    /// Both durations must be positive and the interval must not exceed the timeout.
    pub fn new(poll_interval: Duration, timeout: Duration) -> Result<Self, ConfigError> {
        if poll_interval.is_zero() || timeout.is_zero() {
            return Err(ConfigError::InvalidBarrier(
                "poll interval and timeout must be positive".into(),
            ));
        }
        if poll_interval > timeout {
            return Err(ConfigError::InvalidBarrier(format!(
                "poll interval {poll_interval:?} exceeds timeout {timeout:?}"
            )));
        }
        Ok(Self {
            poll_interval,
            timeout,
        })
    }

    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Block until `path` exists in `store`, returning how long the wait took.
///
/// Checks once before sleeping, so an existing artifact releases immediately.
/// Fails with [`BuildError::Timeout`] once `timeout` has elapsed and with
/// [`BuildError::Aborted`] as soon as `abort` is raised. Never retries.
pub fn wait_for_artifact(
    store: &dyn ArtifactStore,
    path: &Path,
    barrier: BarrierConfig,
    abort: &AbortSignal,
) -> Result<Duration, BuildError> {
    let start = Instant::now();

    loop {
        if store.exists(path) {
            return Ok(start.elapsed());
        }
        if abort.is_raised() {
            return Err(BuildError::Aborted);
        }

        let elapsed = start.elapsed();
        if elapsed >= barrier.timeout() {
            return Err(BuildError::Timeout {
                path: path.to_path_buf(),
                elapsed,
            });
        }

        thread::sleep(barrier.poll_interval().min(barrier.timeout() - elapsed));
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use parking_lot::Mutex;
    use rustc_hash::FxHashSet;
    use std::{
        fs,
        path::PathBuf,
        sync::Arc,
    };
    use tempfile::TempDir;

    /// In-memory artifact store.
    #[derive(Debug, Clone, Default)]
    pub struct MemoryStore {
        artifacts: Arc<Mutex<FxHashSet<PathBuf>>>,
    }

    impl MemoryStore {
        pub fn insert(&self, path: impl Into<PathBuf>) {
            self.artifacts.lock().insert(path.into());
        }
    }

    impl ArtifactStore for MemoryStore {
        fn exists(&self, path: &Path) -> bool {
            self.artifacts.lock().contains(path)
        }
    }

    fn barrier(poll_ms: u64, timeout_ms: u64) -> BarrierConfig {
        BarrierConfig::new(
            Duration::from_millis(poll_ms),
            Duration::from_millis(timeout_ms),
        )
        .unwrap()
    }

    #[test]
    fn test_barrier_config_validation() {
        assert!(BarrierConfig::new(Duration::ZERO, Duration::from_secs(1)).is_err());
        assert!(BarrierConfig::new(Duration::from_millis(10), Duration::ZERO).is_err());
        assert!(BarrierConfig::new(Duration::from_secs(2), Duration::from_secs(1)).is_err());
        assert!(BarrierConfig::new(Duration::from_secs(1), Duration::from_secs(1)).is_ok());
    }

    #[test]
    fn test_returns_immediately_when_artifact_exists() {
        let store = MemoryStore::default();
        store.insert("client-manifest.json");

        let waited = wait_for_artifact(
            &store,
            Path::new("client-manifest.json"),
            barrier(500, 5_000),
            &AbortSignal::new(),
        )
        .unwrap();

        assert!(waited < Duration::from_millis(500));
    }

    #[test]
    fn test_times_out_without_artifact() {
        let store = MemoryStore::default();
        let start = Instant::now();

        let err = wait_for_artifact(
            &store,
            Path::new("client-manifest.json"),
            barrier(10, 50),
            &AbortSignal::new(),
        )
        .unwrap_err();

        assert!(start.elapsed() >= Duration::from_millis(50));
        match err {
            BuildError::Timeout { path, elapsed } => {
                assert_eq!(path, Path::new("client-manifest.json"));
                assert!(elapsed >= Duration::from_millis(50));
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[test]
    fn test_timeout_message_names_path() {
        let err = wait_for_artifact(
            &MemoryStore::default(),
            Path::new("gen/client-manifest.json"),
            barrier(50, 50),
            &AbortSignal::new(),
        )
        .unwrap_err();

        assert!(err.to_string().contains("gen/client-manifest.json"));
    }

    #[test]
    fn test_releases_when_file_appears() {
        let dir = TempDir::new().unwrap();
        let manifest = dir.path().join("client-manifest.json");

        let writer = {
            let manifest = manifest.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(10));
                fs::write(manifest, "{}").unwrap();
            })
        };

        let waited =
            wait_for_artifact(&FsStore, &manifest, barrier(20, 1_000), &AbortSignal::new())
                .unwrap();
        writer.join().unwrap();

        assert!(waited < Duration::from_millis(1_000));
    }

    #[test]
    fn test_releases_when_memory_artifact_appears() {
        let store = MemoryStore::default();
        let writer = {
            let store = store.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(10));
                store.insert("client-manifest.json");
            })
        };

        let result = wait_for_artifact(
            &store,
            Path::new("client-manifest.json"),
            barrier(20, 1_000),
            &AbortSignal::new(),
        );
        writer.join().unwrap();

        assert!(result.is_ok());
    }

    #[test]
    fn test_abort_ends_wait() {
        let abort = AbortSignal::new();
        let handle = abort.clone();
        let raiser = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            handle.raise();
        });

        let start = Instant::now();
        let err = wait_for_artifact(
            &MemoryStore::default(),
            Path::new("never.json"),
            barrier(5, 10_000),
            &abort,
        )
        .unwrap_err();
        raiser.join().unwrap();

        assert!(matches!(err, BuildError::Aborted));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_fs_store_ignores_directories() {
        let dir = TempDir::new().unwrap();
        assert!(!FsStore.exists(dir.path()));
        assert!(!FsStore.exists(&dir.path().join("missing.json")));

        let file = dir.path().join("client-manifest.json");
        fs::write(&file, "{}").unwrap();
        assert!(FsStore.exists(&file));
    }
}
