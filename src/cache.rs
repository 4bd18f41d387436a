//! Process handle cache.
//!
//! A handle only carries what cannot change while a process lives: its PID,
//! its directory under the proc root and its start time. Command lines and
//! counters are read again every cycle, so a process that execs shows its
//! new command on the next cycle.
//!
//! PIDs are reused by the kernel. A handle whose start time no longer
//! matches the one in `stat` belongs to a previous owner of the PID and is
//! replaced.

use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::trace;

/// Per-PID data that is fixed for the lifetime of one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessHandle {
    pub pid: u32,
    pub proc_path: PathBuf,
    /// `starttime` from `stat`, in clock ticks since boot.
    pub start_ticks: u64,
}

impl ProcessHandle {
    pub fn new(pid: u32, proc_path: &Path, start_ticks: u64) -> Self {
        Self {
            pid,
            proc_path: proc_path.to_path_buf(),
            start_ticks,
        }
    }
}

/// Concurrent PID -> handle map shared by all worker threads of a cycle.
#[derive(Debug, Default)]
pub struct ProcessCache {
    handles: DashMap<u32, Arc<ProcessHandle>>,
}

impl ProcessCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached handle for `pid` if it was created for the same
    /// process (same start time), otherwise caches and returns a new one.
    pub fn handle_for(&self, pid: u32, proc_path: &Path, start_ticks: u64) -> Arc<ProcessHandle> {
        if let Some(h) = self.handles.get(&pid) {
            if h.start_ticks == start_ticks {
                return Arc::clone(h.value());
            }
            trace!(
                "PID {} reused (start {} -> {}), replacing handle",
                pid,
                h.start_ticks,
                start_ticks
            );
        }

        let handle = Arc::new(ProcessHandle::new(pid, proc_path, start_ticks));
        self.handles.insert(pid, Arc::clone(&handle));
        handle
    }

    /// Drops every entry whose PID is not in `live` (sorted ascending).
    pub fn retain_live(&self, live: &[u32]) {
        self.handles.retain(|pid, _| live.binary_search(pid).is_ok());
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
