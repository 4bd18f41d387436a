//! procmetrics-exporter library
//!
//! Collection pipeline and snapshot store behind the exporter binary. The
//! pipeline enumerates processes under a proc mount, samples each one on a
//! bounded worker pool, renders the samples as Prometheus text and
//! publishes the result to a store that scrape requests read from.
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use procmetrics_exporter::{Collector, ProcFs, Snapshot, SnapshotStore};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let collector = Collector::new(Arc::new(ProcFs::new("/proc")), 4)?;
//! let store = SnapshotStore::new();
//!
//! let report = collector.collect()?;
//! store.publish(Snapshot::from_report(report)).await;
//! println!("{}", store.read().await);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod collector;
pub mod error;
pub mod process;
pub mod refresh;
pub mod render;
pub mod snapshot;

// Re-export main types for convenience
pub use cache::ProcessCache;
pub use collector::{Collector, CycleReport, SampleOutcome};
pub use error::{CollectError, ReadError, SkipReason};
pub use process::{ProcFs, ProcessSample, ProcessSource};
pub use refresh::{refresh_once, run_refresh_loop, DEFAULT_REFRESH_INTERVAL};
pub use snapshot::{Snapshot, SnapshotStore};
