//! Error types for process sampling and collection cycles.

use std::io;
use std::path::{Path, PathBuf};

/// Why a single process could not be sampled in a cycle.
///
/// None of these are fatal for the cycle: the collector drops the process
/// and counts the reason.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    /// The pseudo-file is gone, usually because the process exited.
    #[error("{} vanished", path.display())]
    Vanished { path: PathBuf },

    #[error("permission denied reading {}", path.display())]
    PermissionDenied { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed {}: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },
}

impl ReadError {
    /// Classifies an I/O error from reading `path`.
    pub fn from_io(path: &Path, source: io::Error) -> Self {
        let path = path.to_path_buf();
        match source.kind() {
            io::ErrorKind::NotFound => ReadError::Vanished { path },
            io::ErrorKind::PermissionDenied => ReadError::PermissionDenied { path },
            // ESRCH shows up when the task is reaped while the file is open
            _ if source.raw_os_error() == Some(libc::ESRCH) => ReadError::Vanished { path },
            _ => ReadError::Io { path, source },
        }
    }

    pub fn malformed(path: &Path, reason: impl Into<String>) -> Self {
        ReadError::Malformed {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    /// Short reason label used for per-cycle skip accounting.
    pub fn reason(&self) -> SkipReason {
        match self {
            ReadError::Vanished { .. } => SkipReason::Vanished,
            ReadError::PermissionDenied { .. } => SkipReason::PermissionDenied,
            ReadError::Io { .. } => SkipReason::Io,
            ReadError::Malformed { .. } => SkipReason::Malformed,
        }
    }
}

/// Coarse classification of a skipped process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SkipReason {
    Vanished,
    PermissionDenied,
    Io,
    Malformed,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::Vanished => "vanished",
            SkipReason::PermissionDenied => "permission_denied",
            SkipReason::Io => "io",
            SkipReason::Malformed => "malformed",
        }
    }
}

/// A whole collection cycle failed; the previous snapshot stays visible.
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    #[error("failed to list process directory {}: {source}", root.display())]
    Enumerate {
        root: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("collection task aborted: {0}")]
    Aborted(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_io_classification() {
        let p = Path::new("/proc/42/io");

        let e = ReadError::from_io(p, io::Error::from(io::ErrorKind::NotFound));
        assert_eq!(e.reason(), SkipReason::Vanished);

        let e = ReadError::from_io(p, io::Error::from(io::ErrorKind::PermissionDenied));
        assert_eq!(e.reason(), SkipReason::PermissionDenied);

        let e = ReadError::from_io(p, io::Error::from_raw_os_error(libc::ESRCH));
        assert_eq!(e.reason(), SkipReason::Vanished);

        let e = ReadError::from_io(p, io::Error::other("boom"));
        assert_eq!(e.reason(), SkipReason::Io);
    }

    #[test]
    fn test_display_includes_path() {
        let e = ReadError::malformed(Path::new("/proc/7/stat"), "missing utime");
        assert_eq!(e.to_string(), "malformed /proc/7/stat: missing utime");
    }
}
