//! Client metrics.
//!
//! Provides standardized metrics for monitoring API calls:
//! - Request counters by operation and status
//! - Latency histograms
//! - Token refresh outcomes

use metrics::{counter, histogram};

/// Metric name constants for consistency.
pub mod names {
    /// Total API requests by operation and status.
    pub const REQUESTS_TOTAL: &str = "hireflow_requests_total";

    /// Request latency in seconds by operation.
    pub const LATENCY_SECONDS: &str = "hireflow_request_latency_seconds";

    /// Token refresh attempts by outcome.
    pub const TOKEN_REFRESH_TOTAL: &str = "hireflow_token_refresh_total";
}

/// Record metrics for a completed request. `status` 0 means no response.
pub fn record_request(operation: &str, status: u16, latency_ms: f64) {
    counter!(
        names::REQUESTS_TOTAL,
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        names::LATENCY_SECONDS,
        "operation" => operation.to_string()
    )
    .record(latency_ms / 1000.0);
}

/// Record a token refresh attempt.
pub fn record_refresh(outcome: &'static str) {
    counter!(names::TOKEN_REFRESH_TOTAL, "outcome" => outcome).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names() {
        assert!(names::REQUESTS_TOTAL.contains("requests"));
        assert!(names::LATENCY_SECONDS.contains("latency"));
        assert!(names::TOKEN_REFRESH_TOTAL.contains("refresh"));
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_request("jobs.list", 200, 12.5);
        record_refresh("success");
    }
}
