//! Process discovery for the proc root.
//!
//! This module lists the numeric process directories under a proc mount and
//! reads the short process name used as a fallback command label.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::ReadError;

/// Scans the proc root for directories with numeric names.
///
/// Entries that are not directories or whose names do not parse as a
/// non-negative integer are skipped. The only error is failing to list the
/// root itself. PIDs are returned in ascending order.
pub fn list_pids(root: &Path) -> io::Result<Vec<u32>> {
    let mut out = Vec::new();
    for entry in fs::read_dir(root)?.flatten() {
        let name = entry.file_name();
        let name = match name.to_str() {
            Some(v) => v,
            None => continue,
        };
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        let pid: u32 = match name.parse() {
            Ok(v) => v,
            Err(_) => continue,
        };
        // file_type() does not follow symlinks; /proc/self is a link and
        // is non-numeric anyway
        match entry.file_type() {
            Ok(ft) if ft.is_dir() => out.push(pid),
            _ => continue,
        }
    }
    out.sort_unstable();
    Ok(out)
}

/// Reads the short process name from `<proc_path>/comm`.
pub fn read_comm(proc_path: &Path) -> Result<String, ReadError> {
    let path = proc_path.join("comm");
    let s = fs::read_to_string(&path).map_err(|e| ReadError::from_io(&path, e))?;
    Ok(s.trim_end_matches('\n').to_string())
}
