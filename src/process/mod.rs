//! Process-related modules for reading per-process counters from /proc.
//!
//! This module provides:
//! - `scanner`: PID discovery and the short process name
//! - `cmdline`: command and argument labels
//! - `cpu`: cumulative CPU time from `stat`
//! - `memory`: resident memory and block I/O counters
//! - `netdev`: network namespace byte counters
//! - `reader`: the per-process sample and its data source

pub mod cmdline;
pub mod cpu;
pub mod memory;
pub mod netdev;
pub mod reader;
pub mod scanner;

// Re-export commonly used types
pub use cmdline::{parse_cmdline, read_command_line, CommandLine};
pub use cpu::{read_cpu_seconds, read_stat_times, StatTimes, CLK_TCK};
pub use memory::{read_block_io, read_rss_bytes};
pub use netdev::read_net_io;
pub use reader::{ProcFs, ProcessSample, ProcessSource};
pub use scanner::{list_pids, read_comm};
