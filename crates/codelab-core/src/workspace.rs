//! Scratch directory management for in-flight executions.
//!
//! Every run materializes its program text into a uniquely named file under
//! a shared scratch root. Ownership of a file is exclusive to the request
//! that allocated it until release; a background sweep reclaims anything an
//! aborted request left behind once it exceeds the retention window, so the
//! directory never grows without bound.

use crate::errors::ExecError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// A scratch area under a fixed root directory.
#[derive(Debug)]
pub struct ScratchSpace {
    root: PathBuf,
    retention: Duration,
}

impl ScratchSpace {
    /// Create the scratch root (and its parents) if absent.
    pub fn new<P: AsRef<Path>>(root: P, retention: Duration) -> Result<Self, ExecError> {
        let root = root.as_ref();
        std::fs::create_dir_all(root).map_err(|e| {
            ExecError::Config(format!(
                "Failed to create scratch directory {}: {}",
                root.display(),
                e
            ))
        })?;
        let root = root.canonicalize().map_err(|e| {
            ExecError::Config(format!(
                "Failed to resolve scratch directory {}: {}",
                root.display(),
                e
            ))
        })?;
        Ok(Self { root, retention })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reserve a collision-free absolute path for one execution.
    ///
    /// A v4 UUID carries 122 bits of randomness, so concurrent allocations
    /// need no coordination.
    pub fn allocate(&self, extension: &str) -> PathBuf {
        self.root
            .join(format!("{}.{}", Uuid::new_v4(), extension))
    }

    /// Best-effort delete. Deletion is not on the critical path of any
    /// result, so errors are logged and swallowed; the sweep picks up
    /// whatever this misses.
    pub async fn release(&self, path: &Path) {
        if let Err(e) = tokio::fs::remove_file(path).await {
            if e.kind() != ErrorKind::NotFound {
                log::debug!(
                    "could not release scratch file {}: {}",
                    path.display(),
                    e
                );
            }
        }
    }

    /// Delete every file in the scratch root older than the retention
    /// window. A failure on one entry never aborts the sweep of the rest;
    /// a file disappearing mid-sweep counts as already reclaimed.
    pub async fn sweep(&self) {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!(
                    "scratch sweep skipped, cannot read {}: {}",
                    self.root.display(),
                    e
                );
                return;
            }
        };

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    log::warn!("scratch sweep stopped early: {}", e);
                    break;
                }
            };
            let path = entry.path();

            let metadata = match entry.metadata().await {
                Ok(metadata) => metadata,
                // Deleted between listing and stat: already reclaimed.
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => {
                    log::debug!("cannot stat {}: {}", path.display(), e);
                    continue;
                }
            };
            if !metadata.is_file() {
                continue;
            }

            // Creation time is not available on every filesystem; the
            // modification time is equivalent for write-once scratch files.
            let age = metadata
                .created()
                .or_else(|_| metadata.modified())
                .ok()
                .and_then(|t| t.elapsed().ok());
            let Some(age) = age else { continue };

            if age > self.retention {
                match tokio::fs::remove_file(&path).await {
                    Ok(()) => {
                        log::info!("reclaimed orphaned scratch file {}", path.display())
                    }
                    Err(e) if e.kind() == ErrorKind::NotFound => {}
                    Err(e) => {
                        log::debug!("cannot reclaim {}: {}", path.display(), e)
                    }
                }
            }
        }
    }
}

/// Background sweep with an explicit start/stop lifecycle.
///
/// The task sweeps once at startup and then on a fixed period, concurrently
/// with in-flight requests. Dropping the handle without calling
/// [`SweepTask::shutdown`] aborts nothing; the task simply stops when its
/// shutdown channel closes.
pub struct SweepTask {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl SweepTask {
    pub fn spawn(scratch: Arc<ScratchSpace>, period: Duration) -> Self {
        let (shutdown, mut rx) = watch::channel(false);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => scratch.sweep().await,
                    _ = rx.changed() => break,
                }
            }
            log::debug!("scratch sweep task stopped");
        });
        Self { shutdown, handle }
    }

    /// Signal the task to stop and wait for it to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        let _ = self.handle.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::TempDir;

    const HOUR: Duration = Duration::from_secs(3600);

    fn scratch(dir: &TempDir, retention: Duration) -> ScratchSpace {
        ScratchSpace::new(dir.path().join("scratch"), retention).unwrap()
    }

    #[test]
    fn new_creates_missing_directories() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b").join("scratch");
        let space = ScratchSpace::new(&nested, HOUR).unwrap();
        assert!(space.root().is_dir());
    }

    #[test]
    fn allocations_are_unique_and_carry_the_extension() {
        let dir = TempDir::new().unwrap();
        let space = scratch(&dir, HOUR);
        let mut seen = HashSet::new();
        for _ in 0..100 {
            let path = space.allocate("js");
            assert_eq!(path.extension().unwrap(), "js");
            assert!(path.is_absolute());
            assert!(seen.insert(path), "allocate returned a duplicate path");
        }
    }

    #[tokio::test]
    async fn release_of_a_missing_file_is_silent() {
        let dir = TempDir::new().unwrap();
        let space = scratch(&dir, HOUR);
        space.release(&space.allocate("py")).await;
    }

    #[tokio::test]
    async fn release_deletes_the_file() {
        let dir = TempDir::new().unwrap();
        let space = scratch(&dir, HOUR);
        let path = space.allocate("js");
        tokio::fs::write(&path, "console.log(1)").await.unwrap();
        space.release(&path).await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn sweep_reclaims_files_past_the_retention_window() {
        let dir = TempDir::new().unwrap();
        let space = scratch(&dir, Duration::from_millis(10));
        let stale = space.allocate("js");
        tokio::fs::write(&stale, "while(true){}").await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        space.sweep().await;
        assert!(!stale.exists());
    }

    #[tokio::test]
    async fn sweep_preserves_files_within_the_retention_window() {
        let dir = TempDir::new().unwrap();
        let space = scratch(&dir, HOUR);
        let fresh = space.allocate("py");
        tokio::fs::write(&fresh, "print('hi')").await.unwrap();
        space.sweep().await;
        assert!(fresh.exists());
    }

    #[tokio::test]
    async fn sweep_handles_a_mixed_directory() {
        let dir = TempDir::new().unwrap();
        let space = scratch(&dir, Duration::from_millis(10));
        let stale_a = space.allocate("js");
        let stale_b = space.allocate("py");
        tokio::fs::write(&stale_a, "a").await.unwrap();
        tokio::fs::write(&stale_b, "b").await.unwrap();
        // Subdirectories are not scratch files and stay untouched.
        tokio::fs::create_dir(space.root().join("keep")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        space.sweep().await;
        assert!(!stale_a.exists());
        assert!(!stale_b.exists());
        assert!(space.root().join("keep").is_dir());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn sweep_survives_an_entry_vanishing_before_stat() {
        // A dangling symlink stats as NotFound, the same way a file deleted
        // between the directory listing and the stat call does. Neither may
        // abort the sweep of the remaining entries.
        let dir = TempDir::new().unwrap();
        let space = scratch(&dir, Duration::from_millis(10));
        std::os::unix::fs::symlink(
            space.root().join("already-gone.js"),
            space.root().join("dangling.js"),
        )
        .unwrap();
        let stale = space.allocate("py");
        tokio::fs::write(&stale, "print('hi')").await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        space.sweep().await;
        assert!(!stale.exists());
    }

    #[tokio::test]
    async fn sweep_task_stops_on_shutdown() {
        let dir = TempDir::new().unwrap();
        let space = Arc::new(scratch(&dir, HOUR));
        let task = SweepTask::spawn(space, Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(50)).await;
        task.shutdown().await;
    }
}
