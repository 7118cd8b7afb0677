#![allow(dead_code)]
use procwatch::core::{
    Pid, ProcessEnumerator, ProcessHandle, ProcessIdent, SampleError, SampleSource,
};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

/// A scripted probe: a shared, mutable process table plus fixed readings.
///
/// A handle is sampleable while its PID is present in the table, so tests
/// simulate process exits and restarts by editing the table through the
/// handle returned by [`table`](ScriptedProbe::table). Enumerations and
/// cycles are counted.
pub struct ScriptedProbe {
    table: Arc<Mutex<Vec<ProcessIdent>>>,
    enumerations: Arc<AtomicUsize>,
    cycles: Arc<AtomicUsize>,
    pub host_cpu: f64,
    pub host_mem: f64,
    pub process_cpu: f64,
    pub process_mem: f64,
}

impl ScriptedProbe {
    pub fn new(rows: &[(Pid, &str)]) -> Self {
        let table = rows
            .iter()
            .map(|(pid, name)| ProcessIdent {
                pid: *pid,
                name: name.to_string(),
            })
            .collect();
        Self {
            table: Arc::new(Mutex::new(table)),
            enumerations: Arc::new(AtomicUsize::new(0)),
            cycles: Arc::new(AtomicUsize::new(0)),
            host_cpu: 12.345,
            host_mem: 67.891,
            process_cpu: 1.5,
            process_mem: 2.5,
        }
    }

    /// Shared handle on the process table; edit it to simulate process
    /// churn between cycles.
    pub fn table(&self) -> Arc<Mutex<Vec<ProcessIdent>>> {
        self.table.clone()
    }

    /// Shared counter of `running_processes` calls.
    pub fn enumerations(&self) -> Arc<AtomicUsize> {
        self.enumerations.clone()
    }

    /// Shared counter of `begin_cycle` calls.
    pub fn cycles(&self) -> Arc<AtomicUsize> {
        self.cycles.clone()
    }

    fn is_alive(&self, pid: Pid) -> bool {
        self.table.lock().unwrap().iter().any(|row| row.pid == pid)
    }
}

impl ProcessEnumerator for ScriptedProbe {
    fn running_processes(&mut self) -> Vec<ProcessIdent> {
        self.enumerations.fetch_add(1, Ordering::SeqCst);
        self.table.lock().unwrap().clone()
    }
}

impl SampleSource for ScriptedProbe {
    fn begin_cycle(&mut self) {
        self.cycles.fetch_add(1, Ordering::SeqCst);
    }

    fn host_cpu_percent(&self) -> f64 {
        self.host_cpu
    }

    fn host_memory_percent(&self) -> f64 {
        self.host_mem
    }

    fn process_cpu_percent(&self, handle: &ProcessHandle) -> Result<f64, SampleError> {
        if self.is_alive(handle.pid) {
            Ok(self.process_cpu)
        } else {
            Err(SampleError::ProcessNotFound)
        }
    }

    fn process_memory_percent(&self, handle: &ProcessHandle) -> Result<f64, SampleError> {
        if self.is_alive(handle.pid) {
            Ok(self.process_mem)
        } else {
            Err(SampleError::ProcessNotFound)
        }
    }
}
