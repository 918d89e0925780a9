//! Worker statistics tracking

use crate::metrics::{LatencyHistogram, RequestRecord};
use std::time::Instant;

/// Statistics tracked by each worker
#[derive(Debug, Default, Clone)]
pub struct WorkerStats {
    /// Number of request attempts made
    pub attempts: usize,

    /// Attempts that ended with an error (build, transport or parse)
    pub errors: usize,

    /// Responses with a status other than 200
    pub unsuccessful_status: usize,

    /// Sum of hit counts across successful responses
    pub hits: u64,

    /// Records the recorder failed to write
    pub record_failures: usize,

    /// Latency of attempts that reached the network
    pub latency: LatencyHistogram,

    /// Worker start time
    pub started_at: Option<Instant>,

    /// Worker end time
    pub ended_at: Option<Instant>,
}

impl WorkerStats {
    /// Create new empty stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking (records start time)
    pub fn start(&mut self) {
        self.started_at = Some(Instant::now());
    }

    /// Stop tracking (records end time)
    pub fn stop(&mut self) {
        self.ended_at = Some(Instant::now());
    }

    /// Account for one finished attempt
    pub fn observe(&mut self, record: &RequestRecord) {
        self.attempts += 1;
        if record.is_error() {
            self.errors += 1;
        }
        if record.is_unsuccessful_status() {
            self.unsuccessful_status += 1;
        }
        self.hits += record.hits;
        if let Some(ms) = record.elapsed_ms() {
            self.latency.record_ms(ms);
        }
    }

    /// Account for a record that could not be written
    pub fn record_failure(&mut self) {
        self.record_failures += 1;
    }

    /// Attempts that returned 200 and parsed cleanly
    pub fn succeeded(&self) -> usize {
        self.attempts
            .saturating_sub(self.errors + self.unsuccessful_status)
    }

    /// Get success rate (0.0 - 1.0)
    pub fn success_rate(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.succeeded() as f64 / self.attempts as f64
        }
    }

    /// Get elapsed time since start
    pub fn elapsed(&self) -> Option<std::time::Duration> {
        self.started_at.map(|start| {
            self.ended_at
                .map(|end| end.duration_since(start))
                .unwrap_or_else(|| start.elapsed())
        })
    }

    /// Get attempts per second
    pub fn requests_per_second(&self) -> f64 {
        self.elapsed()
            .map(|d| {
                let secs = d.as_secs_f64();
                if secs > 0.0 {
                    self.attempts as f64 / secs
                } else {
                    0.0
                }
            })
            .unwrap_or(0.0)
    }

    /// Merge stats from another worker
    pub fn merge(&mut self, other: &WorkerStats) {
        self.attempts += other.attempts;
        self.errors += other.errors;
        self.unsuccessful_status += other.unsuccessful_status;
        self.hits += other.hits;
        self.record_failures += other.record_failures;
        self.latency.merge(&other.latency);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Local};

    fn record(status: Option<u16>, error: Option<&str>, hits: u64) -> RequestRecord {
        let start = Local::now();
        RequestRecord {
            started_at: Some(start),
            ended_at: Some(start + Duration::milliseconds(20)),
            condition_id: Some(1),
            error: error.map(str::to_string),
            status_code: status,
            hits,
        }
    }

    #[test]
    fn test_worker_stats_defaults() {
        let stats = WorkerStats::default();
        assert_eq!(stats.attempts, 0);
        assert_eq!(stats.errors, 0);
        assert_eq!(stats.hits, 0);
        assert!(stats.latency.is_empty());
        assert!(stats.started_at.is_none());
        assert!(stats.ended_at.is_none());
    }

    #[test]
    fn test_worker_stats_observe() {
        let mut stats = WorkerStats::new();
        stats.observe(&record(Some(200), None, 10));
        stats.observe(&record(Some(200), None, 5));
        stats.observe(&record(Some(500), None, 0));
        stats.observe(&record(None, Some("connection refused"), 0));
        stats.observe(&record(Some(200), Some("invalid JSON"), 0));

        assert_eq!(stats.attempts, 5);
        assert_eq!(stats.errors, 2);
        assert_eq!(stats.unsuccessful_status, 1);
        assert_eq!(stats.hits, 15);
        assert_eq!(stats.succeeded(), 2);
        assert_eq!(stats.latency.len(), 5);
        assert!((stats.success_rate() - 0.4).abs() < 0.001);
    }

    #[test]
    fn test_worker_stats_success_rate_zero_attempts() {
        let stats = WorkerStats::new();
        assert_eq!(stats.success_rate(), 0.0);
    }

    #[test]
    fn test_worker_stats_merge() {
        let mut stats1 = WorkerStats::new();
        stats1.observe(&record(Some(200), None, 3));
        stats1.record_failure();

        let mut stats2 = WorkerStats::new();
        stats2.observe(&record(Some(404), None, 0));
        stats2.observe(&record(None, Some("timeout"), 0));

        stats1.merge(&stats2);

        assert_eq!(stats1.attempts, 3);
        assert_eq!(stats1.errors, 1);
        assert_eq!(stats1.unsuccessful_status, 1);
        assert_eq!(stats1.hits, 3);
        assert_eq!(stats1.record_failures, 1);
        assert_eq!(stats1.latency.len(), 3);
    }

    #[test]
    fn test_worker_stats_start_stop() {
        let mut stats = WorkerStats::new();
        assert!(stats.elapsed().is_none());

        stats.start();
        assert!(stats.started_at.is_some());
        assert!(stats.elapsed().is_some());

        std::thread::sleep(std::time::Duration::from_millis(10));
        stats.stop();

        let elapsed = stats.elapsed().unwrap();
        assert!(elapsed >= std::time::Duration::from_millis(10));
    }
}
