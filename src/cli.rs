//! CLI arguments and subcommands for procmetrics-exporter.
//!
//! This module defines the command-line interface structure using the clap library.
//! Most options can also be set through environment variables, which is how
//! container deployments usually configure the exporter.

use clap::{Parser, Subcommand, ValueEnum};
use std::net::IpAddr;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

/// Log level options for CLI parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Parses a level name as written in a config file (case-insensitive).
    pub fn parse(name: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(name, true).ok()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    /// `Off` disables every event, including errors.
    pub fn level_filter(&self) -> LevelFilter {
        match self {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// Configuration format options for output
#[derive(Debug, Clone, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "procmetrics-exporter",
    about = "Prometheus exporter for per-process CPU, memory, disk and network counters",
    long_about = "Prometheus exporter for per-process CPU, memory, disk and network counters.\n\n\
                  Every process under the proc mount is sampled on a fixed interval and the \
                  latest result is served on /metrics.",
    version,
    propagate_version = true
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// HTTP listen port
    #[arg(short = 'p', long, env = "METRICS_PORT")]
    pub port: Option<u16>,

    /// Bind to specific interface/IP
    #[arg(long, env = "METRICS_BIND")]
    pub bind: Option<IpAddr>,

    /// Mount point of the process-information filesystem
    #[arg(long, env = "PROC_MOUNT")]
    pub proc_mount: Option<PathBuf>,

    /// Mount point of sysfs
    #[arg(long, env = "SYS_MOUNT")]
    pub sys_mount: Option<PathBuf>,

    /// Seconds between the end of one collection and the start of the next
    #[arg(long, env = "REFRESH_INTERVAL_SECS")]
    pub refresh_interval: Option<u64>,

    /// Maximum number of processes read in parallel (0 = one per CPU)
    #[arg(long, env = "MAX_CONCURRENCY")]
    pub max_concurrency: Option<usize>,

    /// Disable the per-PID process handle cache
    #[arg(long)]
    pub no_process_cache: bool,

    /// Log level (overrides the config file, default info)
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Config file (YAML/JSON/TOML)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long)]
    pub no_config: bool,

    /// Print effective merged config and exit
    #[arg(long)]
    pub show_config: bool,

    /// Output format for --show-config
    #[arg(long, value_enum, default_value = "yaml")]
    pub config_format: ConfigFormat,

    /// Validate config and exit (return code 1 on error)
    #[arg(long)]
    pub check_config: bool,
}

/// Subcommands for additional functionality
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate configuration and access to the proc filesystem
    Check,

    /// Run collection cycles once in the foreground and report the results
    Test {
        /// Number of test iterations
        #[arg(short = 'n', long, default_value_t = 1)]
        iterations: usize,

        /// Print the rendered document
        #[arg(long)]
        verbose: bool,
    },
}
