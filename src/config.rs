//! Configuration management for procmetrics-exporter.
//!
//! This module handles loading, merging, and validating configuration from files
//! and CLI arguments/environment variables. It supports YAML, JSON, and TOML formats.

use crate::cli::{Args, ConfigFormat, LogLevel};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use tracing::info;

// Default configuration constants
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 7000;
pub const DEFAULT_PROC_MOUNT: &str = "/proc";
pub const DEFAULT_SYS_MOUNT: &str = "/sys";
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 15;

/// Effective exporter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Server configuration
    pub port: Option<u16>,
    pub bind: Option<String>,

    // Filesystem roots
    #[serde(alias = "proc-mount")]
    pub proc_mount: Option<PathBuf>,
    #[serde(alias = "sys-mount")]
    pub sys_mount: Option<PathBuf>,

    // Collection
    #[serde(alias = "refresh-interval-secs")]
    pub refresh_interval_secs: Option<u64>,
    /// 0 = one reader thread per CPU
    #[serde(alias = "max-concurrency")]
    pub max_concurrency: Option<usize>,
    #[serde(alias = "cache-process-handles")]
    pub cache_process_handles: Option<bool>,

    // Logging
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: Some(DEFAULT_PORT),
            bind: Some(DEFAULT_BIND_ADDR.to_string()),
            proc_mount: Some(PathBuf::from(DEFAULT_PROC_MOUNT)),
            sys_mount: Some(PathBuf::from(DEFAULT_SYS_MOUNT)),
            refresh_interval_secs: Some(DEFAULT_REFRESH_INTERVAL_SECS),
            max_concurrency: Some(0),
            cache_process_handles: Some(true),
            log_level: Some("info".into()),
        }
    }
}

impl Config {
    pub fn proc_mount(&self) -> PathBuf {
        self.proc_mount
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PROC_MOUNT))
    }

    pub fn sys_mount(&self) -> PathBuf {
        self.sys_mount
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SYS_MOUNT))
    }

    /// Effective log level. Unknown names are rejected by validation.
    pub fn log_level(&self) -> LogLevel {
        self.log_level
            .as_deref()
            .and_then(LogLevel::parse)
            .unwrap_or(LogLevel::Info)
    }

    pub fn refresh_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(
            self.refresh_interval_secs
                .unwrap_or(DEFAULT_REFRESH_INTERVAL_SECS),
        )
    }
}

/// Validate effective config (used by --check-config and at startup)
pub fn validate_effective_config(cfg: &Config) -> anyhow::Result<()> {
    if cfg.port == Some(0) {
        anyhow::bail!("port must be between 1 and 65535");
    }

    if let Some(bind) = cfg.bind.as_deref() {
        if bind.parse::<IpAddr>().is_err() {
            anyhow::bail!("Invalid bind address '{}'", bind);
        }
    }

    if let Some(level) = cfg.log_level.as_deref() {
        if LogLevel::parse(level).is_none() {
            anyhow::bail!(
                "Invalid log_level '{}' (expected off, error, warn, info, debug or trace)",
                level
            );
        }
    }

    if cfg.refresh_interval_secs == Some(0) {
        anyhow::bail!("refresh_interval_secs must be greater than 0");
    }

    if cfg
        .proc_mount
        .as_ref()
        .is_some_and(|p| p.as_os_str().is_empty())
    {
        anyhow::bail!("proc_mount must not be empty");
    }

    Ok(())
}

/// Resolves configuration from CLI args (and their environment variables),
/// config file, and defaults.
/// This enforces precedence: CLI/env (if provided) > config file > default.
pub fn resolve_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref())?
    };

    if let Some(bind_ip) = args.bind {
        config.bind = Some(bind_ip.to_string());
    }
    if let Some(cli_port) = args.port {
        config.port = Some(cli_port);
    }
    if let Some(p) = &args.proc_mount {
        config.proc_mount = Some(p.clone());
    }
    if let Some(p) = &args.sys_mount {
        config.sys_mount = Some(p.clone());
    }
    if let Some(secs) = args.refresh_interval {
        config.refresh_interval_secs = Some(secs);
    }
    if let Some(n) = args.max_concurrency {
        config.max_concurrency = Some(n);
    }
    if args.no_process_cache {
        config.cache_process_handles = Some(false);
    }
    if let Some(level) = args.log_level {
        config.log_level = Some(level.as_str().to_string());
    }

    Ok(config)
}

/// Loads a config file, trying the default locations when no path is given.
/// Missing files yield the defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let defaults = [
                "/etc/procmetrics/exporter.yaml",
                "/etc/procmetrics/exporter.yml",
                "/etc/procmetrics/exporter.json",
                "./procmetrics-exporter.yaml",
                "./procmetrics-exporter.yml",
                "./procmetrics-exporter.json",
            ];

            match defaults.iter().find(|p| Path::new(p).exists()) {
                Some(p) => PathBuf::from(p),
                None => return Ok(Config::default()),
            }
        }
    };

    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path)?;

    let config = match path.extension().and_then(|s| s.to_str()) {
        Some("json") => {
            let config: Config = serde_json::from_str(&content)?;
            info!("Loaded JSON configuration from: {}", path.display());
            config
        }
        Some("toml") => {
            let config: Config = toml::from_str(&content)?;
            info!("Loaded TOML configuration from: {}", path.display());
            config
        }
        _ => {
            // Default to YAML
            let config: Config = serde_yaml::from_str(&content)?;
            info!("Loaded YAML configuration from: {}", path.display());
            config
        }
    };

    Ok(fill_defaults(config))
}

/// Fields left out of a config file fall back to the defaults.
fn fill_defaults(cfg: Config) -> Config {
    let d = Config::default();
    Config {
        port: cfg.port.or(d.port),
        bind: cfg.bind.or(d.bind),
        proc_mount: cfg.proc_mount.or(d.proc_mount),
        sys_mount: cfg.sys_mount.or(d.sys_mount),
        refresh_interval_secs: cfg.refresh_interval_secs.or(d.refresh_interval_secs),
        max_concurrency: cfg.max_concurrency.or(d.max_concurrency),
        cache_process_handles: cfg.cache_process_handles.or(d.cache_process_handles),
        log_level: cfg.log_level.or(d.log_level),
    }
}

/// Shows configuration in requested format
pub fn show_config(config: &Config, format: ConfigFormat) -> anyhow::Result<()> {
    let output = match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    };

    println!("{output}");
    Ok(())
}
