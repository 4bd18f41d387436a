//! Application state management for the exporter.
//!
//! This module defines the shared application state that is passed
//! to HTTP handlers and used by the background refresh task.

use procmetrics_exporter::{Collector, SnapshotStore};
use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;

/// Type alias for shared application state.
pub type SharedState = Arc<AppState>;

/// Global application state shared across requests and background tasks.
pub struct AppState {
    /// Latest published exposition document.
    pub store: Arc<SnapshotStore>,
    pub collector: Arc<Collector>,
    pub config: Arc<Config>,
    /// Server start time for uptime logging.
    pub start_time: Instant,
}
