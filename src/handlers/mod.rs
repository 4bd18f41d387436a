//! HTTP endpoint handlers for the exporter.
//!
//! Only `/metrics` is served: the latest snapshot, verbatim.

pub mod metrics;

pub use metrics::metrics_handler;
