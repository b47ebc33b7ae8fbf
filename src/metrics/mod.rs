//! Basic metrics instrumentation for a pipeline run.
//!
//! Provides counters and duration tracking for HTTP requests plus the
//! per-stage totals reported when a run finishes.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Metrics collector shared by both clients and both stages.
#[derive(Debug, Clone)]
pub struct Metrics {
    /// Total number of HTTP requests made
    http_requests_total: Arc<AtomicU64>,

    /// Requests that failed in transport or returned a non-success status
    http_errors_total: Arc<AtomicU64>,

    /// Total duration of all HTTP requests in milliseconds
    http_duration_total_ms: Arc<AtomicU64>,

    /// Contact rows written to the flat file
    records_exported_total: Arc<AtomicU64>,

    /// Template sends answered with status 200
    messages_sent_total: Arc<AtomicU64>,

    /// Conversations assigned with status 200
    conversations_assigned_total: Arc<AtomicU64>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Create a new metrics collector.
    pub fn new() -> Self {
        Self {
            http_requests_total: Arc::new(AtomicU64::new(0)),
            http_errors_total: Arc::new(AtomicU64::new(0)),
            http_duration_total_ms: Arc::new(AtomicU64::new(0)),
            records_exported_total: Arc::new(AtomicU64::new(0)),
            messages_sent_total: Arc::new(AtomicU64::new(0)),
            conversations_assigned_total: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Record an HTTP request with duration.
    pub fn record_http_request(&self, duration: Duration) {
        self.http_requests_total.fetch_add(1, Ordering::Relaxed);
        self.http_duration_total_ms
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    /// Record an HTTP error.
    pub fn record_http_error(&self) {
        self.http_errors_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_records_exported(&self, count: usize) {
        self.records_exported_total
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_message_sent(&self) {
        self.messages_sent_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_conversation_assigned(&self) {
        self.conversations_assigned_total
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Get total HTTP requests.
    pub fn http_requests_total(&self) -> u64 {
        self.http_requests_total.load(Ordering::Relaxed)
    }

    /// Get total HTTP errors.
    pub fn http_errors_total(&self) -> u64 {
        self.http_errors_total.load(Ordering::Relaxed)
    }

    /// Get total HTTP duration in milliseconds.
    pub fn http_duration_total_ms(&self) -> u64 {
        self.http_duration_total_ms.load(Ordering::Relaxed)
    }

    /// Get average HTTP request duration in milliseconds.
    pub fn http_duration_avg_ms(&self) -> f64 {
        let total = self.http_duration_total_ms.load(Ordering::Relaxed);
        let count = self.http_requests_total.load(Ordering::Relaxed);
        if count == 0 {
            0.0
        } else {
            total as f64 / count as f64
        }
    }

    pub fn records_exported_total(&self) -> u64 {
        self.records_exported_total.load(Ordering::Relaxed)
    }

    pub fn messages_sent_total(&self) -> u64 {
        self.messages_sent_total.load(Ordering::Relaxed)
    }

    pub fn conversations_assigned_total(&self) -> u64 {
        self.conversations_assigned_total.load(Ordering::Relaxed)
    }

    /// Get a summary of all metrics.
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            http_requests_total: self.http_requests_total(),
            http_errors_total: self.http_errors_total(),
            http_duration_avg_ms: self.http_duration_avg_ms(),
            records_exported_total: self.records_exported_total(),
            messages_sent_total: self.messages_sent_total(),
            conversations_assigned_total: self.conversations_assigned_total(),
        }
    }
}

/// A snapshot of metrics values.
#[derive(Debug, Clone)]
pub struct MetricsSummary {
    pub http_requests_total: u64,
    pub http_errors_total: u64,
    pub http_duration_avg_ms: f64,
    pub records_exported_total: u64,
    pub messages_sent_total: u64,
    pub conversations_assigned_total: u64,
}

impl fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "exported={} sent={} assigned={} http_requests={} http_errors={} avg_ms={:.1}",
            self.records_exported_total,
            self.messages_sent_total,
            self.conversations_assigned_total,
            self.http_requests_total,
            self.http_errors_total,
            self.http_duration_avg_ms
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new();
        assert_eq!(metrics.http_requests_total(), 0);
        assert_eq!(metrics.http_errors_total(), 0);
        assert_eq!(metrics.http_duration_total_ms(), 0);
        assert_eq!(metrics.http_duration_avg_ms(), 0.0);
    }

    #[test]
    fn test_average_duration() {
        let metrics = Metrics::new();
        metrics.record_http_request(Duration::from_millis(100));
        metrics.record_http_request(Duration::from_millis(200));
        assert_eq!(metrics.http_requests_total(), 2);
        assert_eq!(metrics.http_duration_total_ms(), 300);
        assert_eq!(metrics.http_duration_avg_ms(), 150.0);
    }

    #[test]
    fn test_clones_share_counters() {
        let metrics = Metrics::new();
        let clone = metrics.clone();
        clone.record_records_exported(5);
        clone.record_message_sent();
        clone.record_conversation_assigned();
        clone.record_http_error();

        assert_eq!(metrics.records_exported_total(), 5);
        assert_eq!(metrics.messages_sent_total(), 1);
        assert_eq!(metrics.conversations_assigned_total(), 1);
        assert_eq!(metrics.http_errors_total(), 1);
    }

    #[test]
    fn test_summary_display() {
        let metrics = Metrics::new();
        metrics.record_http_request(Duration::from_millis(40));
        metrics.record_records_exported(3);

        let summary = metrics.summary();
        assert_eq!(summary.http_requests_total, 1);
        assert_eq!(summary.records_exported_total, 3);
        let text = summary.to_string();
        assert!(text.contains("exported=3"));
        assert!(text.contains("avg_ms=40.0"));
    }
}
