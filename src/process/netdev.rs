//! Network namespace byte counters from `/proc/<pid>/net/dev`.
//!
//! The file describes every interface of the process's network namespace,
//! so processes sharing a namespace report the same totals.

use std::fs;
use std::path::Path;

use crate::error::ReadError;

/// Sums `(receive_bytes, transmit_bytes)` over all interface rows.
///
/// The first two lines are headers. Rows that do not carry the full set of
/// 16 counters are skipped, as are individual counters that fail to parse.
pub fn parse_netdev_totals(content: &str) -> (u64, u64) {
    let mut rx = 0u64;
    let mut tx = 0u64;

    for line in content.lines().skip(2) {
        let stats_str = match line.split_once(':') {
            Some((_iface, rest)) => rest,
            None => continue,
        };

        let values: Vec<&str> = stats_str.split_whitespace().collect();
        if values.len() < 16 {
            continue;
        }

        if let Ok(v) = values[0].parse::<u64>() {
            rx = rx.saturating_add(v);
        }
        if let Ok(v) = values[8].parse::<u64>() {
            tx = tx.saturating_add(v);
        }
    }

    (rx, tx)
}

/// Reads network totals for the process at `proc_path`.
pub fn read_net_io(proc_path: &Path) -> Result<(u64, u64), ReadError> {
    let path = proc_path.join("net").join("dev");
    let content = fs::read_to_string(&path).map_err(|e| ReadError::from_io(&path, e))?;
    Ok(parse_netdev_totals(&content))
}
