//! # System Probe
//!
//! This module defines the `SysinfoProbe`, the component that reads host
//! and per-process CPU/memory utilization from the operating system via
//! the `sysinfo` crate.
//!
//! The probe refreshes CPU, memory and the process table in one pass at
//! the start of every sampling cycle; all getters read from that snapshot.
//! `sysinfo` computes CPU usage against the previous refresh, so the first
//! reading after a handle is resolved reports ~0%.

use crate::core::{ProcessEnumerator, ProcessHandle, ProcessIdent, SampleError, SampleSource};
use sysinfo::System;

/// A `sysinfo`-backed process enumerator and sample source.
pub struct SysinfoProbe {
    system: System,
}

impl SysinfoProbe {
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }

    /// The machine's host name, used as the host tag on every point.
    pub fn host_name() -> String {
        System::host_name().unwrap_or_else(|| "unknown".to_string())
    }

    fn process(&self, handle: &ProcessHandle) -> Result<&sysinfo::Process, SampleError> {
        self.system
            .process(sysinfo::Pid::from_u32(handle.pid))
            .ok_or(SampleError::ProcessNotFound)
    }
}

impl Default for SysinfoProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessEnumerator for SysinfoProbe {
    fn running_processes(&mut self) -> Vec<ProcessIdent> {
        self.system.refresh_processes();
        let mut table: Vec<ProcessIdent> = self
            .system
            .processes()
            .iter()
            .map(|(pid, process)| ProcessIdent {
                pid: pid.as_u32(),
                name: process.name().to_string(),
            })
            .collect();
        // sysinfo hands the table back as a hash map; sort so that "first
        // match" is deterministic.
        table.sort_by_key(|ident| ident.pid);
        table
    }
}

impl SampleSource for SysinfoProbe {
    fn begin_cycle(&mut self) {
        self.system.refresh_cpu();
        self.system.refresh_memory();
        self.system.refresh_processes();
    }

    fn host_cpu_percent(&self) -> f64 {
        self.system.global_cpu_info().cpu_usage() as f64
    }

    fn host_memory_percent(&self) -> f64 {
        let total = self.system.total_memory();
        if total == 0 {
            return 0.0;
        }
        self.system.used_memory() as f64 / total as f64 * 100.0
    }

    fn process_cpu_percent(&self, handle: &ProcessHandle) -> Result<f64, SampleError> {
        Ok(self.process(handle)?.cpu_usage() as f64)
    }

    fn process_memory_percent(&self, handle: &ProcessHandle) -> Result<f64, SampleError> {
        let total = self.system.total_memory();
        if total == 0 {
            return Ok(0.0);
        }
        Ok(self.process(handle)?.memory() as f64 / total as f64 * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enumeration_includes_the_current_process() {
        let mut probe = SysinfoProbe::new();
        let own_pid = std::process::id();
        let table = probe.running_processes();
        assert!(table.iter().any(|ident| ident.pid == own_pid));
    }

    #[test]
    fn host_memory_percent_is_in_range() {
        let mut probe = SysinfoProbe::new();
        probe.begin_cycle();
        let mem = probe.host_memory_percent();
        assert!((0.0..=100.0).contains(&mem), "got {mem}");
    }

    #[test]
    fn own_process_is_sampleable() {
        let mut probe = SysinfoProbe::new();
        probe.begin_cycle();
        let handle = ProcessHandle {
            name: "self".to_string(),
            pid: std::process::id(),
        };
        assert!(probe.process_cpu_percent(&handle).is_ok());
        let mem = probe.process_memory_percent(&handle).unwrap();
        assert!(mem >= 0.0);
    }

    #[test]
    fn exited_process_reports_not_found() {
        let mut probe = SysinfoProbe::new();
        probe.begin_cycle();
        // u32::MAX is never a live PID.
        let handle = ProcessHandle {
            name: "ghost".to_string(),
            pid: u32::MAX,
        };
        assert_eq!(
            probe.process_cpu_percent(&handle),
            Err(SampleError::ProcessNotFound)
        );
    }
}
