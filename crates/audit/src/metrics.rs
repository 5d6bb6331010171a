use serde::Serialize;
use std::time::{Duration, Instant};

/// Counters for one audit run
#[derive(Debug, Default)]
pub struct RunMetrics {
    records_read: usize,
    records_classified: usize,
    records_skipped: usize,
    records_without_age: usize,
    total_oracle_time_us: u64,
}

impl RunMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_read(&mut self, has_age: bool) {
        self.records_read += 1;
        if !has_age {
            self.records_without_age += 1;
        }
    }

    pub fn record_oracle_call(&mut self, duration: Duration, classified: bool) {
        self.total_oracle_time_us += duration.as_micros() as u64;
        if classified {
            self.records_classified += 1;
        } else {
            self.records_skipped += 1;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let calls = self.records_classified + self.records_skipped;
        MetricsSnapshot {
            records_read: self.records_read,
            records_classified: self.records_classified,
            records_skipped: self.records_skipped,
            records_without_age: self.records_without_age,
            total_oracle_time_ms: self.total_oracle_time_us as f64 / 1000.0,
            avg_oracle_time_ms: if calls > 0 {
                self.total_oracle_time_us as f64 / calls as f64 / 1000.0 // Convert to ms
            } else {
                0.0
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MetricsSnapshot {
    pub records_read: usize,
    pub records_classified: usize,
    pub records_skipped: usize,
    pub records_without_age: usize,
    pub total_oracle_time_ms: f64,
    pub avg_oracle_time_ms: f64,
}

impl MetricsSnapshot {
    pub fn summary(&self) -> String {
        format!(
            "\nRun summary:\nRecords read: {}\nRecords classified: {}\nRecords skipped (malformed classifier output): {}\nRecords without age: {}\nClassifier time: {:.0} ms total, {:.0} ms average\n",
            self.records_read,
            self.records_classified,
            self.records_skipped,
            self.records_without_age,
            self.total_oracle_time_ms,
            self.avg_oracle_time_ms,
        )
    }
}

pub struct TimedOperation {
    start: Instant,
}

impl TimedOperation {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
