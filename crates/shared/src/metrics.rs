//! # Metrics Collection Module
//!
//! Lock-free counters for the prediction endpoint.
//!
//! ## Design Principles
//!
//! - **Lock-Free**: All counters are atomics updated with relaxed ordering
//! - **Thread Safe**: Safe for concurrent access from request handlers and
//!   blocking inference threads
//! - **Serializable**: Snapshots serialize straight to JSON for `/metrics`

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tracing::debug;

/// Thread-safe metrics collector for prediction requests
///
/// ## Usage Example
///
/// ```rust
/// use harvest_shared::metrics::MetricsCollector;
/// use std::time::Duration;
///
/// let metrics = MetricsCollector::new();
/// {
///     let _active = metrics.record_request();
///     metrics.record_prediction(Duration::from_millis(12));
/// }
///
/// let snapshot = metrics.snapshot();
/// assert_eq!(snapshot.total_requests, 1);
/// assert_eq!(snapshot.active_requests, 0);
/// assert_eq!(snapshot.successful_predictions, 1);
/// ```
#[derive(Debug)]
pub struct MetricsCollector {
    /// Total number of prediction requests received
    total_requests: AtomicU64,

    /// Number of requests currently being processed
    active_requests: AtomicUsize,

    /// Requests that produced a label
    successful_predictions: AtomicU64,

    /// Requests that ended with a rendered error message
    failed_predictions: AtomicU64,

    /// Cumulative time spent in successful predictions (microseconds)
    inference_time_us: AtomicU64,

    /// When collection started
    start_time: Instant,
}

impl MetricsCollector {
    /// Creates a new metrics collector with all counters at zero
    pub fn new() -> Self {
        debug!("Initializing metrics collector");

        Self {
            total_requests: AtomicU64::new(0),
            active_requests: AtomicUsize::new(0),
            successful_predictions: AtomicU64::new(0),
            failed_predictions: AtomicU64::new(0),
            inference_time_us: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Records a new incoming prediction request
    ///
    /// The request counts as active until the returned guard is dropped,
    /// including when the handler future is dropped mid-request.
    #[inline]
    pub fn record_request(&self) -> ActiveRequest<'_> {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.active_requests.fetch_add(1, Ordering::Relaxed);
        ActiveRequest { metrics: self }
    }

    /// Records a request that produced a label
    #[inline]
    pub fn record_prediction(&self, elapsed: Duration) {
        self.successful_predictions.fetch_add(1, Ordering::Relaxed);
        self.inference_time_us
            .fetch_add(elapsed.as_micros() as u64, Ordering::Relaxed);
    }

    /// Records a request that failed before or during inference
    #[inline]
    pub fn record_error(&self) {
        self.failed_predictions.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    fn finish_request(&self) {
        // Saturate so an unmatched completion never wraps the gauge
        let _ = self
            .active_requests
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
    }

    /// Takes a consistent-enough point-in-time view of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        let successful = self.successful_predictions.load(Ordering::Relaxed);
        let failed = self.failed_predictions.load(Ordering::Relaxed);
        let inference_us = self.inference_time_us.load(Ordering::Relaxed);
        let completed = successful + failed;

        MetricsSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            active_requests: self.active_requests.load(Ordering::Relaxed),
            successful_predictions: successful,
            failed_predictions: failed,
            error_rate: if completed > 0 {
                (failed as f64 / completed as f64) * 100.0
            } else {
                0.0
            },
            avg_inference_time_ms: if successful > 0 {
                (inference_us as f64 / successful as f64) / 1000.0
            } else {
                0.0
            },
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }
}

/// Marks one request as in flight; dropping it ends the request
#[derive(Debug)]
#[must_use = "the request stops counting as active when the guard is dropped"]
pub struct ActiveRequest<'a> {
    metrics: &'a MetricsCollector,
}

impl Drop for ActiveRequest<'_> {
    fn drop(&mut self) {
        self.metrics.finish_request();
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time view of the prediction counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Total prediction requests received
    pub total_requests: u64,
    /// Requests currently in flight
    pub active_requests: usize,
    /// Requests that produced a label
    pub successful_predictions: u64,
    /// Requests that ended with an error message
    pub failed_predictions: u64,
    /// Percentage of completed requests that failed
    pub error_rate: f64,
    /// Mean wall time of successful predictions in milliseconds
    pub avg_inference_time_ms: f64,
    /// Seconds since the collector was created
    pub uptime_seconds: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmatched_completion_does_not_underflow() {
        let metrics = MetricsCollector::new();
        metrics.finish_request();
        assert_eq!(metrics.snapshot().active_requests, 0);
    }

    #[test]
    fn test_guard_ends_request_without_outcome() {
        let metrics = MetricsCollector::new();
        let active = metrics.record_request();
        assert_eq!(metrics.snapshot().active_requests, 1);

        drop(active);
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.active_requests, 0);
        assert_eq!(snapshot.total_requests, 1);
        assert_eq!(snapshot.successful_predictions + snapshot.failed_predictions, 0);
    }

    #[test]
    fn test_average_inference_time() {
        let metrics = MetricsCollector::new();
        for ms in [10, 30] {
            let _active = metrics.record_request();
            metrics.record_prediction(Duration::from_millis(ms));
        }

        let snapshot = metrics.snapshot();
        assert!((snapshot.avg_inference_time_ms - 20.0).abs() < 0.01);
    }
}
