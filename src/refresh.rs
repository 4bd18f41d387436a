//! Background refresh loop.
//!
//! Cycles run one after another: collect, publish, sleep. The interval is
//! the gap between the end of one cycle and the start of the next, so a slow
//! cycle pushes every later cycle back instead of overlapping with it.

use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument};

use crate::collector::Collector;
use crate::error::CollectError;
use crate::snapshot::{Snapshot, SnapshotStore};

/// Default gap between cycles.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(15);

/// Runs one cycle on the blocking pool and publishes it on success.
///
/// On failure the store is left untouched.
#[instrument(skip(collector, store))]
pub async fn refresh_once(
    collector: &Arc<Collector>,
    store: &SnapshotStore,
) -> Result<(), CollectError> {
    let c = Arc::clone(collector);
    let report = tokio::task::spawn_blocking(move || c.collect())
        .await
        .map_err(|e| CollectError::Aborted(e.to_string()))??;

    info!(
        "Published {} processes ({} skipped) in {:.2}ms",
        report.sampled,
        report.skipped_total(),
        report.duration.as_secs_f64() * 1000.0
    );
    store.publish(Snapshot::from_report(report)).await;
    Ok(())
}

/// Refreshes forever. Per-cycle failures are logged and never end the loop.
pub async fn run_refresh_loop(collector: Arc<Collector>, store: Arc<SnapshotStore>, interval: Duration) {
    info!(
        "Refresh loop started (interval {}s, {} reader threads)",
        interval.as_secs_f64(),
        collector.concurrency()
    );
    loop {
        if let Err(e) = refresh_once(&collector, &store).await {
            error!("Error collecting metrics: {}", e);
        }
        tokio::time::sleep(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReadError;
    use crate::process::reader::fixture::write_process;
    use crate::process::{ProcFs, ProcessSample, ProcessSource};
    use std::fs;
    use std::io;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_refresh_once_publishes() {
        let dir = tempdir().expect("Failed to create temp dir");
        write_process(dir.path(), 3, b"/usr/bin/top\0");

        let collector = Arc::new(Collector::new(Arc::new(ProcFs::new(dir.path())), 1).unwrap());
        let store = SnapshotStore::new();
        refresh_once(&collector, &store).await.unwrap();

        let snap = store.current().await.expect("snapshot published");
        assert_eq!(snap.processes, 1);
        assert!(snap.document.contains("command=\"top\""));
    }

    #[tokio::test]
    async fn test_failed_cycle_keeps_previous_snapshot() {
        let dir = tempdir().expect("Failed to create temp dir");
        let root = dir.path().join("proc");
        fs::create_dir(&root).expect("Failed to create proc dir");
        write_process(&root, 3, b"/usr/bin/top\0");

        let collector = Arc::new(Collector::new(Arc::new(ProcFs::new(&root)), 1).unwrap());
        let store = SnapshotStore::new();
        refresh_once(&collector, &store).await.unwrap();
        let before = store.read().await;

        fs::remove_dir_all(&root).expect("Failed to remove proc dir");
        let err = refresh_once(&collector, &store).await.unwrap_err();
        assert!(matches!(err, CollectError::Enumerate { .. }));
        assert_eq!(store.read().await, before);
    }

    /// Fails the first enumeration, then reports one process.
    struct FlakySource {
        root: PathBuf,
        listings: AtomicUsize,
    }

    impl ProcessSource for FlakySource {
        fn list_pids(&self) -> io::Result<Vec<u32>> {
            match self.listings.fetch_add(1, Ordering::SeqCst) {
                0 => Err(io::Error::new(io::ErrorKind::Other, "proc not mounted yet")),
                _ => Ok(vec![1]),
            }
        }

        fn read_sample(&self, pid: u32) -> Result<ProcessSample, ReadError> {
            Ok(ProcessSample {
                pid,
                command: "init".into(),
                args: String::new(),
                cpu_usage: 1.0,
                memory_bytes: 4096,
                disk_read_bytes: 0,
                disk_write_bytes: 0,
                network_receive_bytes: 0,
                network_transmit_bytes: 0,
            })
        }

        fn root(&self) -> &Path {
            &self.root
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_retries_after_interval_following_failure() {
        let source = Arc::new(FlakySource {
            root: PathBuf::from("/proc"),
            listings: AtomicUsize::new(0),
        });
        let dyn_source: Arc<dyn ProcessSource> = Arc::clone(&source) as _;
        let collector = Arc::new(Collector::new(dyn_source, 1).unwrap());
        let store = Arc::new(SnapshotStore::new());

        let handle = tokio::spawn(run_refresh_loop(
            collector,
            Arc::clone(&store),
            Duration::from_secs(15),
        ));

        // First cycle fails right away, nothing is published
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(source.listings.load(Ordering::SeqCst), 1);
        assert!(store.current().await.is_none());

        // Still inside the sleep that follows the failed cycle
        tokio::time::sleep(Duration::from_secs(13)).await;
        assert_eq!(source.listings.load(Ordering::SeqCst), 1);
        assert!(store.current().await.is_none());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(source.listings.load(Ordering::SeqCst), 2);
        let snap = store.current().await.expect("second cycle published");
        assert_eq!(snap.processes, 1);
        assert!(snap.document.contains("pid=\"1\",command=\"init\""));

        assert!(!handle.is_finished());
        handle.abort();
    }
}
