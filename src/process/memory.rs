//! Resident memory and block I/O counters.
//!
//! `VmRSS` comes from `/proc/<pid>/status`, the byte counters from
//! `/proc/<pid>/io` (needs root or CAP_SYS_PTRACE for foreign processes).

use std::fs;
use std::path::Path;

use crate::error::ReadError;

/// Parses kilobyte values from status lines ("   1234 kB").
pub fn parse_kb_value(v: &str) -> Option<u64> {
    v.split_whitespace().next()?.parse().ok()
}

/// Reads the resident set size in bytes.
///
/// Kernel threads have no `VmRSS` line and report 0.
pub fn read_rss_bytes(proc_path: &Path) -> Result<u64, ReadError> {
    let path = proc_path.join("status");
    let content = fs::read_to_string(&path).map_err(|e| ReadError::from_io(&path, e))?;

    for line in content.lines() {
        if let Some(v) = line.strip_prefix("VmRSS:") {
            let kb =
                parse_kb_value(v).ok_or_else(|| ReadError::malformed(&path, "unparsable VmRSS"))?;
            return kb
                .checked_mul(1024)
                .ok_or_else(|| ReadError::malformed(&path, "VmRSS overflows u64 bytes"));
        }
    }

    Ok(0)
}

/// Reads `(read_bytes, write_bytes)` from the I/O accounting file.
pub fn read_block_io(proc_path: &Path) -> Result<(u64, u64), ReadError> {
    let path = proc_path.join("io");
    let content = fs::read_to_string(&path).map_err(|e| ReadError::from_io(&path, e))?;

    let mut read_bytes = None;
    let mut write_bytes = None;

    for line in content.lines() {
        if let Some(v) = line.strip_prefix("read_bytes:") {
            read_bytes = v.trim().parse().ok();
        } else if let Some(v) = line.strip_prefix("write_bytes:") {
            write_bytes = v.trim().parse().ok();
        }

        if read_bytes.is_some() && write_bytes.is_some() {
            break;
        }
    }

    match (read_bytes, write_bytes) {
        (Some(r), Some(w)) => Ok((r, w)),
        _ => Err(ReadError::malformed(&path, "missing read_bytes/write_bytes")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const IO_CONTENT: &str = "rchar: 4096\nwchar: 2048\nsyscr: 10\nsyscw: 5\nread_bytes: 8192\nwrite_bytes: 12288\ncancelled_write_bytes: 0\n";

    #[test]
    fn test_parse_kb_value() {
        assert_eq!(parse_kb_value("       1234 kB"), Some(1234));
        assert_eq!(parse_kb_value("0 kB"), Some(0));
        assert_eq!(parse_kb_value("  42  "), Some(42));
        assert_eq!(parse_kb_value(""), None);
        assert_eq!(parse_kb_value("abc kB"), None);
        assert_eq!(parse_kb_value("-1 kB"), None);
    }

    #[test]
    fn test_read_rss_bytes() {
        let dir = tempdir().expect("Failed to create temp dir");
        fs::write(
            dir.path().join("status"),
            "Name:\tbash\nVmPeak:\t  10000 kB\nVmRSS:\t    5120 kB\nThreads:\t1\n",
        )
        .expect("Failed to write status");

        assert_eq!(read_rss_bytes(dir.path()).unwrap(), 5120 * 1024);
    }

    #[test]
    fn test_read_rss_bytes_kernel_thread() {
        let dir = tempdir().expect("Failed to create temp dir");
        fs::write(dir.path().join("status"), "Name:\tkthreadd\nThreads:\t1\n")
            .expect("Failed to write status");

        assert_eq!(read_rss_bytes(dir.path()).unwrap(), 0);
    }

    #[test]
    fn test_read_rss_bytes_malformed() {
        let dir = tempdir().expect("Failed to create temp dir");
        fs::write(dir.path().join("status"), "VmRSS:\tlots kB\n").expect("Failed to write status");

        assert!(matches!(
            read_rss_bytes(dir.path()),
            Err(ReadError::Malformed { .. })
        ));
    }

    #[test]
    fn test_read_rss_bytes_overflow() {
        let dir = tempdir().expect("Failed to create temp dir");
        fs::write(
            dir.path().join("status"),
            "Name:\tbig\nVmRSS:\t18446744073709551615 kB\n",
        )
        .expect("Failed to write status");

        assert!(matches!(
            read_rss_bytes(dir.path()),
            Err(ReadError::Malformed { .. })
        ));
    }

    #[test]
    fn test_read_block_io() {
        let dir = tempdir().expect("Failed to create temp dir");
        fs::write(dir.path().join("io"), IO_CONTENT).expect("Failed to write io");

        assert_eq!(read_block_io(dir.path()).unwrap(), (8192, 12288));
    }

    #[test]
    fn test_read_block_io_truncated() {
        let dir = tempdir().expect("Failed to create temp dir");
        fs::write(dir.path().join("io"), "rchar: 1\nread_bytes: 5\n").expect("Failed to write io");

        assert!(matches!(
            read_block_io(dir.path()),
            Err(ReadError::Malformed { .. })
        ));
    }

    #[test]
    fn test_read_block_io_missing() {
        let dir = tempdir().expect("Failed to create temp dir");
        assert!(matches!(
            read_block_io(dir.path()),
            Err(ReadError::Vanished { .. })
        ));
    }
}
