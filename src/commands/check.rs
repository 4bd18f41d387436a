//! Check command implementation.
//!
//! Validates system requirements and configuration.

use nix::unistd::geteuid;
use procmetrics_exporter::process::list_pids;
use procmetrics_exporter::{ProcFs, ProcessSource};

use crate::config::{validate_effective_config, Config};

/// Validates system requirements and configuration.
pub fn command_check(config: &Config) -> anyhow::Result<()> {
    println!("🔍 procmetrics-exporter - System Check");
    println!("======================================");

    let mut all_ok = true;
    let proc_mount = config.proc_mount();
    let sys_mount = config.sys_mount();

    println!("\n📁 Checking {}...", proc_mount.display());
    match list_pids(&proc_mount) {
        Ok(pids) if pids.is_empty() => {
            println!("   ❌ No process directories found");
            all_ok = false;
        }
        Ok(pids) => println!("   ✅ Found {} process directories", pids.len()),
        Err(e) => {
            println!("   ❌ Cannot list {}: {}", proc_mount.display(), e);
            all_ok = false;
        }
    }

    // Our own PID as seen through the configured mount (may differ in a
    // container with a host proc mount, so a miss is not fatal)
    println!("\n🧪 Sampling own process...");
    let self_pid = std::process::id();
    match ProcFs::new(&proc_mount).read_sample(self_pid) {
        Ok(s) => println!(
            "   ✅ PID {} ({}): RSS={}MB, CPU={:.2}s",
            s.pid,
            s.command,
            s.memory_bytes / 1024 / 1024,
            s.cpu_usage
        ),
        Err(e) => println!("   ⚠️  PID {} not sampled: {}", self_pid, e),
    }

    println!("\n👤 Checking privileges...");
    if geteuid().is_root() {
        println!("   ✅ Running as root");
    } else {
        println!("   ⚠️  Not running as root - foreign processes may be skipped");
    }

    println!("\n📂 Checking {}...", sys_mount.display());
    if sys_mount.exists() {
        println!("   ✅ Present");
    } else {
        println!("   ⚠️  Not found");
    }

    println!("\n⚙️  Checking configuration...");
    match validate_effective_config(config) {
        Ok(_) => println!("   ✅ Configuration is valid"),
        Err(e) => {
            println!("   ❌ Configuration invalid: {}", e);
            all_ok = false;
        }
    }

    println!("\n📋 Summary:");
    if all_ok {
        println!("   ✅ All checks passed - system is ready");
        Ok(())
    } else {
        println!("   ❌ Some checks failed - please review warnings");
        std::process::exit(1);
    }
}
