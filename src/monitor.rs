//! The sampling control loop.
//!
//! One cycle samples the host (when enabled) and every resolved process,
//! feeds each sample to the batching sink, then sleeps. The process list
//! is re-resolved on a configurable cycle cadence so restarted processes
//! are picked up under their new PIDs.

use crate::config::Config;
use crate::core::{ProcessEnumerator, SampleError, SampleSource, OS_SUBJECT};
use crate::registry::ProcessRegistry;
use crate::sink::BatchingSink;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::watch;
use tracing::{info, warn};

/// The steady-state monitor loop.
///
/// Everything the loop mutates — the probe snapshot, the handle list and
/// the batch buffer — is owned exclusively by this value; sampling,
/// flushing and re-resolution are strictly sequential.
pub struct Monitor<P> {
    probe: P,
    registry: ProcessRegistry,
    sink: BatchingSink,
    host: String,
    sample_os: bool,
    delay: Duration,
    reload_cycles: u32,
    cycles_since_reload: u32,
}

impl<P: SampleSource + ProcessEnumerator> Monitor<P> {
    pub fn new(probe: P, sink: BatchingSink, config: &Config, host: String) -> Self {
        Self {
            probe,
            registry: ProcessRegistry::new(config.process.names.clone()),
            sink,
            host,
            sample_os: config.process.sample_os,
            delay: Duration::from_secs(config.sampling.delay_seconds),
            reload_cycles: config.process.reload_cycles.max(1),
            cycles_since_reload: 1,
        }
    }

    /// Resolves the configured process names against the live process
    /// table, replacing the current handle set.
    pub fn resolve_processes(&mut self) {
        info!("Loading processes list...");
        self.registry.resolve(&mut self.probe);
        info!(
            "...done, {}/{} configured processes running",
            self.registry.handles().len(),
            self.registry.names().len()
        );
    }

    /// Runs one sampling pass: the host first (when OS sampling is
    /// enabled), then every resolved process. A process that has exited
    /// since resolution is reported and skipped; it stays in the handle
    /// list until the next scheduled re-resolution.
    pub async fn run_cycle(&mut self) {
        self.probe.begin_cycle();

        if self.sample_os {
            let cpu = self.probe.host_cpu_percent();
            let mem = self.probe.host_memory_percent();
            self.sink
                .record(&self.host, OS_SUBJECT, cpu, mem, epoch_seconds())
                .await;
        }

        if self.registry.handles().is_empty() {
            info!("No process to monitor");
            return;
        }

        for handle in self.registry.handles() {
            let sample = self.probe.process_cpu_percent(handle).and_then(|cpu| {
                self.probe
                    .process_memory_percent(handle)
                    .map(|mem| (cpu, mem))
            });
            match sample {
                Ok((cpu, mem)) => {
                    self.sink
                        .record(&self.host, &handle.name, cpu, mem, epoch_seconds())
                        .await;
                }
                Err(SampleError::ProcessNotFound) => {
                    warn!("{} - no process running", handle.name);
                }
            }
        }
    }

    /// Advances the re-resolution schedule after a completed cycle: the
    /// counter starts at 1, and when it reaches the configured interval
    /// the process list is re-resolved and the counter resets.
    pub fn finish_cycle(&mut self) {
        if self.cycles_since_reload >= self.reload_cycles {
            self.resolve_processes();
            self.cycles_since_reload = 1;
        } else {
            self.cycles_since_reload += 1;
        }
    }

    /// Runs the loop until `shutdown_rx` fires, then drains any pending
    /// points with a final flush.
    pub async fn run(mut self, mut shutdown_rx: watch::Receiver<bool>) {
        self.resolve_processes();
        loop {
            self.run_cycle().await;
            tokio::select! {
                biased;
                _ = shutdown_rx.changed() => {
                    info!("Monitor received shutdown signal.");
                    break;
                }
                _ = tokio::time::sleep(self.delay) => {}
            }
            self.finish_cycle();
        }
        self.sink.flush().await;
        info!("Monitor loop finished.");
    }

    /// The batching sink, exposed for inspection.
    pub fn sink(&self) -> &BatchingSink {
        &self.sink
    }
}

fn epoch_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs() as i64)
}
