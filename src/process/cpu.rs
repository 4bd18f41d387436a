//! CPU time parsing from `/proc/<pid>/stat`.
//!
//! The exported "CPU usage" value is cumulative user + system time in
//! seconds (clock ticks divided by `_SC_CLK_TCK`). No delta against a
//! previous cycle is taken, so it grows monotonically for a live process.

use once_cell::sync::Lazy;
use std::fs;
use std::path::Path;

use crate::error::ReadError;

/// Get system clock ticks per second (usually 100, but can vary).
fn get_clk_tck() -> f64 {
    #[cfg(unix)]
    {
        // SAFETY: sysconf is safe to call with _SC_CLK_TCK
        // Returns -1 on error, 0 if undefined - both are handled by the > 0 check
        unsafe {
            let tck = libc::sysconf(libc::_SC_CLK_TCK);
            if tck > 0 {
                return tck as f64;
            }
        }
    }
    100.0
}

/// System clock ticks per second (for CPU time calculation).
pub static CLK_TCK: Lazy<f64> = Lazy::new(get_clk_tck);

/// Timing fields of one `stat` read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatTimes {
    pub utime: u64,
    pub stime: u64,
    /// Process start, in clock ticks since boot. Identifies a PID's owner.
    pub start_ticks: u64,
}

impl StatTimes {
    /// utime + stime, `None` on overflow.
    pub fn total_ticks(&self) -> Option<u64> {
        self.utime.checked_add(self.stime)
    }
}

/// Parses utime, stime and starttime from the content of a stat file.
///
/// Fields are counted after the last `)` so a `comm` containing spaces or
/// parentheses does not shift them. utime, stime and starttime are fields
/// 14, 15 and 22 of the full line, i.e. 12th, 13th and 20th after the
/// closing parenthesis.
pub fn parse_stat_times(content: &str) -> Option<StatTimes> {
    let rest = &content[content.rfind(')')? + 1..];
    let mut fields = rest.split_whitespace().skip(11);
    let utime = fields.next()?.parse().ok()?;
    let stime = fields.next()?.parse().ok()?;
    let start_ticks = fields.nth(6)?.parse().ok()?;
    Some(StatTimes {
        utime,
        stime,
        start_ticks,
    })
}

/// Reads the timing fields of the process at `proc_path`.
pub fn read_stat_times(proc_path: &Path) -> Result<StatTimes, ReadError> {
    let path = proc_path.join("stat");
    let content = fs::read_to_string(&path).map_err(|e| ReadError::from_io(&path, e))?;

    parse_stat_times(&content).ok_or_else(|| ReadError::malformed(&path, "missing stat fields"))
}

/// Converts utime + stime to CPU seconds.
pub fn cpu_seconds(times: &StatTimes, proc_path: &Path) -> Result<f64, ReadError> {
    let ticks = times
        .total_ticks()
        .ok_or_else(|| ReadError::malformed(&proc_path.join("stat"), "utime+stime overflow"))?;
    Ok(ticks as f64 / *CLK_TCK)
}

/// Reads cumulative CPU seconds (user + system) for the process at `proc_path`.
pub fn read_cpu_seconds(proc_path: &Path) -> Result<f64, ReadError> {
    cpu_seconds(&read_stat_times(proc_path)?, proc_path)
}
