//! Startup requirement validation for procmetrics-exporter.
//!
//! This module checks that the exporter can see the proc filesystem before
//! the refresh loop starts. Problems are reported but only an unlistable proc
//! root is returned as an error; the exporter keeps running either way.

use nix::unistd::geteuid;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Validate all runtime requirements
pub fn validate_requirements(proc_mount: &Path, sys_mount: &Path) -> Result<(), ValidationError> {
    info!("🔍 Validating runtime requirements...");

    check_user_privileges();
    check_proc_root(proc_mount)?;
    check_foreign_process_access(proc_mount);
    check_sys_mount(sys_mount);

    info!("✅ Runtime requirements validated");
    Ok(())
}

/// Check if running with sufficient privileges
fn check_user_privileges() {
    if !geteuid().is_root() {
        warn!("⚠️  Not running as root - I/O counters of other users' processes are unreadable");
        warn!("   Those processes will be missing from /metrics");
    } else {
        info!("✅ Running as root (uid=0)");
    }
}

/// The proc root must be listable, otherwise every cycle fails
fn check_proc_root(proc_mount: &Path) -> Result<(), ValidationError> {
    match fs::read_dir(proc_mount) {
        Ok(_) => {
            info!("✅ {} is listable", proc_mount.display());
            Ok(())
        }
        Err(e) => {
            error!("❌ Cannot list {}: {}", proc_mount.display(), e);
            error!("   Set PROC_MOUNT or --proc-mount to the host proc mount");
            Err(ValidationError::ProcNotReadable(format!(
                "{}: {}",
                proc_mount.display(),
                e
            )))
        }
    }
}

/// Reads `<proc>/1/io`. PID 1 usually belongs to root, and its `io` file is
/// the per-process read that needs privileges (`stat` is world-readable).
fn read_foreign_io(proc_mount: &Path) -> std::io::Result<PathBuf> {
    let test_file = proc_mount.join("1").join("io");
    fs::read_to_string(&test_file)?;
    Ok(test_file)
}

fn check_foreign_process_access(proc_mount: &Path) {
    let test_file = proc_mount.join("1").join("io");
    match read_foreign_io(proc_mount) {
        Ok(_) => info!("✅ /proc access: Can read all processes"),
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            warn!("⚠️  Cannot read {} - insufficient permissions", test_file.display());
            warn!("   Only user-owned processes will be exported");
            warn!("   Grant capabilities: setcap cap_dac_read_search,cap_sys_ptrace+ep /path/to/binary");
        }
        Err(e) => debug!("Could not test {}: {}", test_file.display(), e),
    }
}

/// sysfs is not read by the collectors; only report whether it is there
fn check_sys_mount(sys_mount: &Path) {
    if sys_mount.exists() {
        debug!("sysfs found at {}", sys_mount.display());
    } else {
        warn!("⚠️  {} not found", sys_mount.display());
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Process filesystem not readable: {0}")]
    ProcNotReadable(String),
}
