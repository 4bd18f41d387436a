//! procmetrics-exporter - version 0.1.0
//!
//! Per-process Prometheus exporter with tracing logging.
//! This is the main entry point that initializes the server and handles subcommands.

mod cli;
mod commands;
mod config;
mod handlers;
mod startup_checks;
mod state;

use axum::{routing::get, Router};
use clap::Parser;
use procmetrics_exporter::{run_refresh_loop, Collector, ProcFs, ProcessCache, ProcessSource, SnapshotStore};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::{net::TcpListener, signal};
use tracing::{debug, error, info};

use cli::{Args, Commands};
use commands::{command_check, command_test};
use config::{
    resolve_config, show_config, validate_effective_config, Config, DEFAULT_BIND_ADDR, DEFAULT_PORT,
};
use handlers::metrics_handler;
use state::{AppState, SharedState};

/// Initializes tracing logging subsystem with configured log level.
fn setup_logging(config: &Config) {
    let log_level = config.log_level();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level.level_filter())
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    info!("Logging initialized with level: {}", log_level.as_str());
}

/// Builds the proc data source, with the handle cache when enabled.
pub(crate) fn build_source(config: &Config) -> (Arc<dyn ProcessSource>, Option<Arc<ProcessCache>>) {
    let fs = ProcFs::new(config.proc_mount());
    if config.cache_process_handles.unwrap_or(true) {
        let cache = Arc::new(ProcessCache::new());
        (Arc::new(fs.with_cache(Arc::clone(&cache))), Some(cache))
    } else {
        (Arc::new(fs), None)
    }
}

/// Helper function to load and validate configuration.
/// Exits the process with error code 1 if validation fails.
fn load_validated_config(args: &Args) -> anyhow::Result<Config> {
    let config = resolve_config(args)?;
    if let Err(e) = validate_effective_config(&config) {
        eprintln!("❌ Configuration invalid: {}", e);
        std::process::exit(1);
    }
    Ok(config)
}

/// Resolves when SIGINT or SIGTERM arrives.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), shutting down gracefully...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        }
    }
}

/// Main application entry point.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.show_config || args.check_config {
        let config = resolve_config(&args)?;

        if args.check_config {
            if let Err(e) = validate_effective_config(&config) {
                eprintln!("❌ Configuration invalid: {}", e);
                std::process::exit(1);
            }
            println!("✅ Configuration is valid");
            return Ok(());
        }

        return show_config(&config, args.config_format.clone());
    }

    if let Some(command) = &args.command {
        let config = load_validated_config(&args)?;

        return match command {
            Commands::Check => command_check(&config),
            Commands::Test {
                iterations,
                verbose,
            } => command_test(*iterations, *verbose, &config),
        };
    }

    let config = load_validated_config(&args)?;

    setup_logging(&config);

    info!(
        "Starting procmetrics-exporter {} (built {})",
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_BUILD_TIMESTAMP")
    );

    let proc_mount = config.proc_mount();
    if let Err(e) = startup_checks::validate_requirements(&proc_mount, &config.sys_mount()) {
        error!("❌ Startup validation failed: {}", e);
        error!("   The exporter will start but every collection will fail until this is fixed!");
    }

    let bind_ip_str = config.bind.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
    let port = config.port.unwrap_or(DEFAULT_PORT);
    let addr: SocketAddr = format!("{}:{}", bind_ip_str, port).parse()?;

    let (source, cache) = build_source(&config);
    if cache.is_some() {
        debug!("Process handle cache enabled");
    }
    let collector = Arc::new(Collector::new(source, config.max_concurrency.unwrap_or(0))?);

    let state: SharedState = Arc::new(AppState {
        store: Arc::new(SnapshotStore::new()),
        collector,
        config: Arc::new(config.clone()),
        start_time: Instant::now(),
    });

    // Bind before starting the refresh loop: a bind failure is fatal
    let listener = TcpListener::bind(addr).await.map_err(|e| {
        error!("Failed to bind {}: {}", addr, e);
        e
    })?;

    let refresh = tokio::spawn(run_refresh_loop(
        Arc::clone(&state.collector),
        Arc::clone(&state.store),
        state.config.refresh_interval(),
    ));

    let app = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(state.clone());

    info!(
        "procmetrics-exporter listening on http://{}:{} (proc root {})",
        bind_ip_str,
        port,
        proc_mount.display()
    );

    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                error!("Server error: {}", e);
                refresh.abort();
                return Err(e.into());
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received, exiting...");
        }
    }

    refresh.abort();
    info!(
        "procmetrics-exporter stopped gracefully after {:.0}s",
        state.start_time.elapsed().as_secs_f64()
    );
    Ok(())
}
