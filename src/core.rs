//! Core domain types and service traits for procwatch
//!
//! This module defines the fundamental data structures and trait contracts
//! that govern component interactions throughout the application.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// OS process identifier.
pub type Pid = u32;

/// Reserved subject label for host-level samples.
pub const OS_SUBJECT: &str = "OS";

/// One row of the OS process table: a running process and its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessIdent {
    pub pid: Pid,
    pub name: String,
}

/// A live reference to one monitored OS process.
///
/// Created by the registry when a running process matches a configured
/// name; invalid once that process exits. Handles are never mutated, only
/// replaced wholesale on re-resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessHandle {
    /// The configured name this handle was resolved from, used as the
    /// subject tag on every sample taken through it.
    pub name: String,
    pub pid: Pid,
}

/// A single measurement awaiting transmission: fields `cpu_perc` and
/// `mem_perc`, tags `host` and `process`, and an epoch-seconds timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub measurement: String,
    /// Host tag: the machine the subject runs on.
    pub host: String,
    /// Subject tag: a configured process name, or [`OS_SUBJECT`] for the
    /// host itself.
    pub subject: String,
    pub cpu_perc: f64,
    pub mem_perc: f64,
    /// Seconds since the UNIX epoch, UTC.
    pub timestamp: i64,
}

impl Point {
    /// Renders the point in InfluxDB line protocol:
    /// `<measurement>,host=<h>,process=<s> cpu_perc=<v>,mem_perc=<v> <ts>`.
    ///
    /// This is both the wire format of a batch write and the verbose echo
    /// format.
    pub fn to_line_protocol(&self) -> String {
        format!(
            "{},host={},process={} cpu_perc={:?},mem_perc={:?} {}",
            escape_measurement(&self.measurement),
            escape_tag(&self.host),
            escape_tag(&self.subject),
            self.cpu_perc,
            self.mem_perc,
            self.timestamp
        )
    }
}

/// Escapes `,`, `=` and spaces in tag keys and values.
fn escape_tag(value: &str) -> String {
    value
        .replace(',', "\\,")
        .replace('=', "\\=")
        .replace(' ', "\\ ")
}

/// Escapes `,` and spaces in a measurement name. Unlike tags, `=` is
/// allowed verbatim here.
fn escape_measurement(value: &str) -> String {
    value.replace(',', "\\,").replace(' ', "\\ ")
}

// =============================================================================
// Service Traits
// =============================================================================

/// Error raised when sampling a resolved process.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SampleError {
    /// The handle's underlying OS process has exited since resolution.
    #[error("process not found")]
    ProcessNotFound,
}

/// Enumerates the live OS process table.
pub trait ProcessEnumerator {
    /// Returns every running process with name and identifier, in stable
    /// table order (ascending PID).
    fn running_processes(&mut self) -> Vec<ProcessIdent>;
}

/// Reads current CPU and memory utilization for the host and for resolved
/// process handles.
///
/// CPU percentages are stateful: `begin_cycle` takes one snapshot per
/// sampling cycle and the getters report usage over the window since the
/// previous snapshot, so values are comparable cycle-to-cycle. Per-process
/// CPU% is unclamped and can exceed 100 on multicore hosts.
pub trait SampleSource {
    /// Takes one snapshot of CPU, memory and process state. Called exactly
    /// once at the start of every sampling cycle.
    fn begin_cycle(&mut self);

    /// Host-wide CPU utilization, in percent.
    fn host_cpu_percent(&self) -> f64;

    /// Host-wide memory utilization, in percent of total memory.
    fn host_memory_percent(&self) -> f64;

    /// CPU utilization of one process, in percent.
    ///
    /// # Returns
    /// * `Err(SampleError::ProcessNotFound)` once the process has exited
    fn process_cpu_percent(&self, handle: &ProcessHandle) -> Result<f64, SampleError>;

    /// Memory utilization of one process, in percent of total memory.
    ///
    /// # Returns
    /// * `Err(SampleError::ProcessNotFound)` once the process has exited
    fn process_memory_percent(&self, handle: &ProcessHandle) -> Result<f64, SampleError>;
}

/// Writes batches of points to a remote sink.
#[async_trait]
pub trait PointWriter: Send + Sync {
    /// A short endpoint description (e.g. `"localhost:8086"`), used in
    /// flush status lines.
    fn endpoint(&self) -> &str;

    /// Writes a batch of points.
    ///
    /// # Returns
    /// * `Ok(())` if the whole batch was accepted by the sink
    /// * `Err` if the write failed (network error, sink rejection, ...)
    async fn write_points(&self, points: &[Point]) -> Result<()>;
}
