#![allow(dead_code)]
use async_trait::async_trait;
use procwatch::core::{Point, PointWriter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// A mock `PointWriter` that records every batch it is asked to write and
/// can be switched into a failing mode.
pub struct RecordingWriter {
    batches: Mutex<Vec<Vec<Point>>>,
    fail: AtomicBool,
}

impl RecordingWriter {
    pub fn new() -> Self {
        Self {
            batches: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
        }
    }

    pub fn failing() -> Self {
        let writer = Self::new();
        writer.fail.store(true, Ordering::SeqCst);
        writer
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Every batch attempted so far, including failed ones.
    pub fn batches(&self) -> Vec<Vec<Point>> {
        self.batches.lock().unwrap().clone()
    }

    pub fn total_points(&self) -> usize {
        self.batches.lock().unwrap().iter().map(Vec::len).sum()
    }
}

#[async_trait]
impl PointWriter for RecordingWriter {
    fn endpoint(&self) -> &str {
        "mock:0"
    }

    async fn write_points(&self, points: &[Point]) -> anyhow::Result<()> {
        self.batches.lock().unwrap().push(points.to_vec());
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("mock write failure");
        }
        Ok(())
    }
}
