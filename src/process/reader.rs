//! Per-process sampling.
//!
//! [`ProcessSource`] is the seam between the collector and the data source.
//! [`ProcFs`] implements it on top of a mounted proc filesystem.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cache::{ProcessCache, ProcessHandle};
use crate::error::ReadError;
use crate::process::cmdline::read_command_line;
use crate::process::cpu::{cpu_seconds, read_stat_times};
use crate::process::memory::{read_block_io, read_rss_bytes};
use crate::process::netdev::read_net_io;
use crate::process::scanner::list_pids;

/// Counters of one process for one cycle. Built once, rendered, dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessSample {
    pub pid: u32,
    pub command: String,
    pub args: String,
    /// Cumulative user + system CPU seconds (see [`crate::process::cpu`]).
    pub cpu_usage: f64,
    pub memory_bytes: u64,
    pub disk_read_bytes: u64,
    pub disk_write_bytes: u64,
    pub network_receive_bytes: u64,
    pub network_transmit_bytes: u64,
}

/// Source of process identifiers and per-process samples.
///
/// Implementations must be callable from many worker threads at once.
pub trait ProcessSource: Send + Sync {
    /// Lists the PIDs currently present. An error aborts the cycle.
    fn list_pids(&self) -> io::Result<Vec<u32>>;

    /// Samples one PID. An error only drops that PID from the cycle.
    fn read_sample(&self, pid: u32) -> Result<ProcessSample, ReadError>;

    /// Called once per successful enumeration with the live PID set.
    fn retain_live(&self, _live: &[u32]) {}

    /// Location shown in enumeration errors.
    fn root(&self) -> &Path;
}

/// Reads samples from a proc mount such as `/proc` or `/host/proc`.
pub struct ProcFs {
    root: PathBuf,
    cache: Option<Arc<ProcessCache>>,
}

impl ProcFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: None,
        }
    }

    /// Enables the process handle cache.
    pub fn with_cache(mut self, cache: Arc<ProcessCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    fn handle(&self, pid: u32, proc_path: &Path, start_ticks: u64) -> Arc<ProcessHandle> {
        match &self.cache {
            Some(cache) => cache.handle_for(pid, proc_path, start_ticks),
            None => Arc::new(ProcessHandle::new(pid, proc_path, start_ticks)),
        }
    }
}

impl ProcessSource for ProcFs {
    fn list_pids(&self) -> io::Result<Vec<u32>> {
        list_pids(&self.root)
    }

    fn read_sample(&self, pid: u32) -> Result<ProcessSample, ReadError> {
        let proc_path = self.root.join(pid.to_string());

        let times = read_stat_times(&proc_path)?;
        let handle = self.handle(pid, &proc_path, times.start_ticks);
        let proc_path = handle.proc_path.as_path();

        // cmdline changes on exec, so it is never taken from the handle
        let command_line = read_command_line(proc_path)?;
        let cpu_usage = cpu_seconds(&times, proc_path)?;
        let memory_bytes = read_rss_bytes(proc_path)?;
        let (disk_read_bytes, disk_write_bytes) = read_block_io(proc_path)?;
        let (network_receive_bytes, network_transmit_bytes) = read_net_io(proc_path)?;

        Ok(ProcessSample {
            pid,
            command: command_line.command,
            args: command_line.args,
            cpu_usage,
            memory_bytes,
            disk_read_bytes,
            disk_write_bytes,
            network_receive_bytes,
            network_transmit_bytes,
        })
    }

    fn retain_live(&self, live: &[u32]) {
        if let Some(cache) = &self.cache {
            cache.retain_live(live);
        }
    }

    fn root(&self) -> &Path {
        &self.root
    }
}

/// Helpers for building fake proc trees in tests.
#[cfg(test)]
pub(crate) mod fixture {
    use std::fs;
    use std::path::Path;

    pub const NETDEV: &str = "Inter-|   Receive                                                |  Transmit\n face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed\n  eth0: 2048      20    0    0    0     0          0         0     1024      10    0    0    0     0       0          0\n";

    /// Writes a complete process directory `<root>/<pid>`.
    pub fn write_process(root: &Path, pid: u32, cmdline: &[u8]) {
        let dir = root.join(pid.to_string());
        fs::create_dir_all(dir.join("net")).expect("Failed to create process dir");
        fs::write(dir.join("cmdline"), cmdline).expect("Failed to write cmdline");
        fs::write(dir.join("comm"), "fallback\n").expect("Failed to write comm");
        fs::write(
            dir.join("stat"),
            format!("{pid} (proc) S 1 1 1 0 -1 0 0 0 0 0 300 100 0 0 20 0 1 0 10 0 0"),
        )
        .expect("Failed to write stat");
        fs::write(dir.join("status"), "Name:\tproc\nVmRSS:\t    2048 kB\n")
            .expect("Failed to write status");
        fs::write(
            dir.join("io"),
            "rchar: 1\nwchar: 1\nread_bytes: 4096\nwrite_bytes: 512\n",
        )
        .expect("Failed to write io");
        fs::write(dir.join("net/dev"), NETDEV).expect("Failed to write net/dev");
    }
}
