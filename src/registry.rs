//! Resolution of configured process names into live process handles.

use crate::core::{ProcessEnumerator, ProcessHandle};
use tracing::debug;

/// Resolves a configured list of process names against the OS process
/// table and owns the resulting handle set.
///
/// Re-resolution replaces the whole set; handles are never reused across
/// resolutions, so per-process sampling state (the CPU% window) resets
/// with them.
pub struct ProcessRegistry {
    names: Vec<String>,
    handles: Vec<ProcessHandle>,
}

impl ProcessRegistry {
    /// Creates a registry for the given configured names. No resolution
    /// happens until [`resolve`](Self::resolve) is called.
    pub fn new(names: Vec<String>) -> Self {
        Self {
            names,
            handles: Vec::new(),
        }
    }

    /// Takes one snapshot of the process table and resolves each
    /// configured name, in order, to the first process in table order
    /// whose name matches exactly. A name with no running match yields no
    /// handle.
    pub fn resolve(&mut self, enumerator: &mut dyn ProcessEnumerator) {
        let table = enumerator.running_processes();
        let mut handles = Vec::with_capacity(self.names.len());
        for name in &self.names {
            match table.iter().find(|ident| ident.name == *name) {
                Some(ident) => handles.push(ProcessHandle {
                    name: name.clone(),
                    pid: ident.pid,
                }),
                None => debug!(process = %name, "no running process matches"),
            }
        }
        self.handles = handles;
    }

    /// The handles from the most recent resolution.
    pub fn handles(&self) -> &[ProcessHandle] {
        &self.handles
    }

    /// The configured process names.
    pub fn names(&self) -> &[String] {
        &self.names
    }
}
