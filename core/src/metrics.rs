//! Per-request records and latency aggregation

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timestamp format used in the result log
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Number of columns in a result log row
pub const ROW_COLUMNS: usize = 8;

/// Outcome of a single request attempt
///
/// One record is produced per attempt, whatever the outcome, and is never
/// modified after it has been handed to a recorder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestRecord {
    /// When the request was sent (absent if it was never sent)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Local>>,

    /// When the response or transport error arrived
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Local>>,

    /// Identifier of the condition the request was built from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition_id: Option<i64>,

    /// Error message if the attempt failed at any stage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// HTTP status code, if a response was received
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,

    /// Total hit count reported by the search response
    pub hits: u64,
}

impl RequestRecord {
    /// Create an empty record for the given condition
    pub fn for_condition(condition_id: Option<i64>) -> Self {
        Self {
            condition_id,
            ..Default::default()
        }
    }

    /// Whether the attempt failed
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Whether a response arrived with a status other than 200
    pub fn is_unsuccessful_status(&self) -> bool {
        matches!(self.status_code, Some(code) if code != 200)
    }

    /// Wall-clock latency, truncated to whole milliseconds
    pub fn elapsed_ms(&self) -> Option<i64> {
        match (self.started_at, self.ended_at) {
            (Some(start), Some(end)) => Some((end - start).num_milliseconds()),
            _ => None,
        }
    }

    /// Render the record as a fixed-width row of log fields
    ///
    /// Missing values are rendered as empty fields.
    pub fn to_row(&self) -> [String; ROW_COLUMNS] {
        let fmt_time = |t: Option<DateTime<Local>>| {
            t.map(|t| t.format(TIME_FORMAT).to_string())
                .unwrap_or_default()
        };

        [
            fmt_time(self.started_at),
            fmt_time(self.ended_at),
            self.elapsed_ms()
                .map(|ms| ms.to_string())
                .unwrap_or_default(),
            self.condition_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
            if self.is_error() { "1" } else { "0" }.to_string(),
            self.error.clone().unwrap_or_default(),
            self.status_code
                .map(|code| code.to_string())
                .unwrap_or_default(),
            self.hits.to_string(),
        ]
    }
}

/// Latency percentiles (all values in milliseconds)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct LatencyPercentiles {
    /// Minimum value
    pub min: f64,
    /// 50th percentile (median)
    pub p50: f64,
    /// 90th percentile
    pub p90: f64,
    /// 95th percentile
    pub p95: f64,
    /// 99th percentile
    pub p99: f64,
    /// Maximum value
    pub max: f64,
    /// Mean value
    pub mean: f64,
}

/// Latency histogram backed by HdrHistogram
///
/// Bounded memory regardless of run length, and cheap to merge across
/// workers at drain.
#[derive(Clone)]
pub struct LatencyHistogram {
    histogram: hdrhistogram::Histogram<u64>,
}

impl LatencyHistogram {
    /// Create a new histogram
    /// Microsecond precision, max 1 hour
    pub fn new() -> Self {
        let histogram = hdrhistogram::Histogram::new_with_bounds(1, 3_600_000_000, 3)
            .expect("static histogram bounds are valid");
        Self { histogram }
    }

    /// Record a duration
    pub fn record(&mut self, duration: Duration) {
        let micros = duration.as_micros().min(u64::MAX as u128) as u64;
        self.histogram.saturating_record(micros.max(1));
    }

    /// Record a value in whole milliseconds
    pub fn record_ms(&mut self, ms: i64) {
        self.record(Duration::from_millis(ms.max(0) as u64));
    }

    /// Merge another histogram into this one
    pub fn merge(&mut self, other: &LatencyHistogram) {
        let _ = self.histogram.add(&other.histogram);
    }

    /// Get the number of recorded values
    pub fn len(&self) -> u64 {
        self.histogram.len()
    }

    /// Check if the histogram is empty
    pub fn is_empty(&self) -> bool {
        self.histogram.is_empty()
    }

    /// Calculate percentiles from the histogram
    pub fn percentiles(&self) -> LatencyPercentiles {
        if self.histogram.is_empty() {
            return LatencyPercentiles::default();
        }

        LatencyPercentiles {
            min: self.histogram.min() as f64 / 1000.0,
            p50: self.histogram.value_at_quantile(0.50) as f64 / 1000.0,
            p90: self.histogram.value_at_quantile(0.90) as f64 / 1000.0,
            p95: self.histogram.value_at_quantile(0.95) as f64 / 1000.0,
            p99: self.histogram.value_at_quantile(0.99) as f64 / 1000.0,
            max: self.histogram.max() as f64 / 1000.0,
            mean: self.histogram.mean() / 1000.0,
        }
    }
}

impl Default for LatencyHistogram {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LatencyHistogram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LatencyHistogram")
            .field("len", &self.len())
            .finish()
    }
}
