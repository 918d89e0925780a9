//! Result aggregation from multiple workers

use std::time::Duration;

use crate::metrics::{LatencyHistogram, LatencyPercentiles};
use crate::worker::WorkerStats;

/// Aggregated statistics from all workers
#[derive(Debug, Clone, Default)]
pub struct AggregatedStats {
    /// Number of workers that completed
    pub total_workers: usize,

    /// Total request attempts
    pub total_attempts: usize,

    /// Attempts that ended with an error
    pub total_errors: usize,

    /// Responses with a status other than 200
    pub total_unsuccessful_status: usize,

    /// Sum of reported hit counts
    pub total_hits: u64,

    /// Records that could not be written to the log
    pub total_record_failures: usize,

    /// Maximum duration across all workers
    pub total_duration: Duration,

    /// Overall attempts per second
    pub requests_per_second: f64,

    /// Latency percentiles across all workers
    pub latency: LatencyPercentiles,
}

impl AggregatedStats {
    /// Attempts that returned 200 and parsed cleanly
    pub fn total_succeeded(&self) -> usize {
        self.total_attempts
            .saturating_sub(self.total_errors + self.total_unsuccessful_status)
    }

    /// Get the success rate (0.0 - 1.0)
    pub fn success_rate(&self) -> f64 {
        if self.total_attempts > 0 {
            self.total_succeeded() as f64 / self.total_attempts as f64
        } else {
            0.0
        }
    }

    /// Get the error rate (0.0 - 1.0)
    pub fn error_rate(&self) -> f64 {
        if self.total_attempts > 0 {
            self.total_errors as f64 / self.total_attempts as f64
        } else {
            0.0
        }
    }
}

/// Aggregate statistics from multiple workers
pub fn aggregate_worker_stats(stats: &[WorkerStats]) -> AggregatedStats {
    if stats.is_empty() {
        return AggregatedStats::default();
    }

    let mut latency = LatencyHistogram::new();
    for s in stats {
        latency.merge(&s.latency);
    }

    let total_attempts: usize = stats.iter().map(|s| s.attempts).sum();

    // Use the maximum elapsed time across all workers
    let total_duration = stats
        .iter()
        .filter_map(|s| s.elapsed())
        .max()
        .unwrap_or(Duration::ZERO);

    let secs = total_duration.as_secs_f64();
    let requests_per_second = if secs > 0.0 {
        total_attempts as f64 / secs
    } else {
        0.0
    };

    AggregatedStats {
        total_workers: stats.len(),
        total_attempts,
        total_errors: stats.iter().map(|s| s.errors).sum(),
        total_unsuccessful_status: stats.iter().map(|s| s.unsuccessful_status).sum(),
        total_hits: stats.iter().map(|s| s.hits).sum(),
        total_record_failures: stats.iter().map(|s| s.record_failures).sum(),
        total_duration,
        requests_per_second,
        latency: latency.percentiles(),
    }
}
