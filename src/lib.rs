//! procwatch - a lightweight process and host utilization monitor
//!
//! This library samples CPU and memory utilization for a configured set of
//! named OS processes (plus the host itself) and ships the samples as
//! time-series points to an InfluxDB-compatible endpoint, batching writes
//! to bound network overhead.

pub mod cli;
pub mod config;
pub mod core;
pub mod influx;
pub mod monitor;
pub mod probe;
pub mod registry;
pub mod sink;

// Re-export core types for convenience
pub use crate::core::*;
