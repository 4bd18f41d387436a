//! CLI command implementations for procmetrics-exporter.
//!
//! This module provides implementations for all CLI subcommands:
//! - `check`: System validation
//! - `test`: Foreground collection test

pub mod check;

// Re-export command functions
pub use check::command_check;
pub use test::command_test;
