//! Batching of sample points and flushing to the remote sink.

use crate::config::{FlushFailureMode, SamplingConfig};
use crate::core::{Point, PointWriter};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// What to do with a batch whose write attempt fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushPolicy {
    /// Report the failure and drop the batch. The baseline behavior: no
    /// retry, no persistence of unsent data.
    Discard,
    /// Retry the write up to `attempts` more times, sleeping `backoff`
    /// between attempts, then drop the batch.
    Retry { attempts: u32, backoff: Duration },
}

impl FlushPolicy {
    pub fn from_config(config: &SamplingConfig) -> Self {
        match config.on_flush_failure {
            FlushFailureMode::Discard => FlushPolicy::Discard,
            FlushFailureMode::Retry => FlushPolicy::Retry {
                attempts: config.retry_attempts,
                backoff: Duration::from_millis(config.retry_backoff_ms),
            },
        }
    }
}

/// Accumulates points and writes them to the remote sink in bounded
/// batches.
///
/// The pending buffer is owned exclusively by this value. A flush is
/// triggered the moment the buffer reaches `max_batch_size`, and the
/// buffer is cleared after every flush attempt, pass or fail.
pub struct BatchingSink {
    writer: Arc<dyn PointWriter>,
    points: Vec<Point>,
    measurement: String,
    max_batch_size: usize,
    print_data: bool,
    policy: FlushPolicy,
}

impl BatchingSink {
    pub fn new(
        writer: Arc<dyn PointWriter>,
        measurement: String,
        max_batch_size: usize,
        print_data: bool,
        policy: FlushPolicy,
    ) -> Self {
        Self {
            writer,
            points: Vec::with_capacity(max_batch_size),
            measurement,
            max_batch_size: max_batch_size.max(1),
            print_data,
            policy,
        }
    }

    /// Buffers one sample. Percentages are rounded to two decimals before
    /// the point is stored, and the point is echoed to stdout first when
    /// verbose output is on. Reaching the configured batch size triggers a
    /// flush.
    pub async fn record(
        &mut self,
        host: &str,
        subject: &str,
        cpu_perc: f64,
        mem_perc: f64,
        timestamp: i64,
    ) {
        let point = Point {
            measurement: self.measurement.clone(),
            host: host.to_string(),
            subject: subject.to_string(),
            cpu_perc: round2(cpu_perc),
            mem_perc: round2(mem_perc),
            timestamp,
        };
        if self.print_data {
            println!("{}", point.to_line_protocol());
        }
        self.points.push(point);
        if self.points.len() >= self.max_batch_size {
            self.flush().await;
        }
    }

    /// Writes the pending batch and clears the buffer regardless of the
    /// outcome. Under [`FlushPolicy::Retry`] the write is re-attempted
    /// before the batch is given up on.
    ///
    /// Returns whether the write succeeded; an empty buffer is a no-op
    /// success.
    pub async fn flush(&mut self) -> bool {
        if self.points.is_empty() {
            return true;
        }
        info!(
            "Sending {} points to [{}]...",
            self.points.len(),
            self.writer.endpoint()
        );
        let mut result = self.writer.write_points(&self.points).await;
        if let FlushPolicy::Retry { attempts, backoff } = self.policy {
            let mut attempt = 0;
            while result.is_err() && attempt < attempts {
                attempt += 1;
                tokio::time::sleep(backoff).await;
                result = self.writer.write_points(&self.points).await;
            }
        }
        let ok = match result {
            Ok(()) => {
                info!("...OK");
                true
            }
            Err(e) => {
                error!("...FAIL: {:#}", e);
                false
            }
        };
        self.points.clear();
        ok
    }

    /// Number of buffered points awaiting the next flush.
    pub fn pending(&self) -> usize {
        self.points.len()
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
