//! Request Metrics
//!
//! In-process counters fed by the request middleware.

use std::collections::VecDeque;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::Serialize;
use utoipa::ToSchema;

const RESPONSE_TIME_WINDOW: usize = 1000;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MetricsSnapshot {
    pub requests_total: u64,
    #[schema(value_type = Object)]
    pub requests_by_endpoint: IndexMap<String, u64>,
    /// Keyed by status class, e.g. `2xx`
    #[schema(value_type = Object)]
    pub requests_by_status: IndexMap<String, u64>,
    /// Mean over the most recent requests, rounded to 2 decimals
    pub avg_response_time_ms: f64,
    pub errors_total: u64,
    pub websocket_connections: usize,
}

#[derive(Default)]
struct Counters {
    requests_total: u64,
    by_endpoint: IndexMap<String, u64>,
    by_status: IndexMap<String, u64>,
    response_times: VecDeque<f64>,
    errors_total: u64,
}

#[derive(Clone, Default)]
pub struct RequestMetrics {
    counters: Arc<Mutex<Counters>>,
}

impl RequestMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, path: &str, status: u16, duration_ms: f64) {
        let mut c = self.counters.lock();
        c.requests_total += 1;
        *c.by_endpoint.entry(path.to_string()).or_insert(0) += 1;
        *c.by_status.entry(format!("{}xx", status / 100)).or_insert(0) += 1;

        c.response_times.push_back(duration_ms);
        if c.response_times.len() > RESPONSE_TIME_WINDOW {
            c.response_times.pop_front();
        }

        if status >= 500 {
            c.errors_total += 1;
        }
    }

    /// WebSocket connections are owned by the registry, so the live count is
    /// supplied by the caller.
    pub fn snapshot(&self, websocket_connections: usize) -> MetricsSnapshot {
        let c = self.counters.lock();
        let avg = if c.response_times.is_empty() {
            0.0
        } else {
            c.response_times.iter().sum::<f64>() / c.response_times.len() as f64
        };

        MetricsSnapshot {
            requests_total: c.requests_total,
            requests_by_endpoint: c.by_endpoint.clone(),
            requests_by_status: c.by_status.clone(),
            avg_response_time_ms: (avg * 100.0).round() / 100.0,
            errors_total: c.errors_total,
            websocket_connections,
        }
    }

    pub fn reset(&self) {
        *self.counters.lock() = Counters::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_snapshot() {
        let metrics = RequestMetrics::new();
        metrics.record("/api/events", 200, 10.0);
        metrics.record("/api/events", 201, 20.0);
        metrics.record("/api/events/EVT-9", 404, 3.0);
        metrics.record("/api/dashboard/stats", 500, 7.0);

        let snap = metrics.snapshot(2);
        assert_eq!(snap.requests_total, 4);
        assert_eq!(snap.requests_by_endpoint["/api/events"], 2);
        assert_eq!(snap.requests_by_status["2xx"], 2);
        assert_eq!(snap.requests_by_status["4xx"], 1);
        assert_eq!(snap.requests_by_status["5xx"], 1);
        assert_eq!(snap.errors_total, 1);
        assert_eq!(snap.avg_response_time_ms, 10.0);
        assert_eq!(snap.websocket_connections, 2);
    }

    #[test]
    fn test_response_time_window() {
        let metrics = RequestMetrics::new();
        metrics.record("/", 200, 1000.0);
        for _ in 0..RESPONSE_TIME_WINDOW {
            metrics.record("/", 200, 1.0);
        }
        assert_eq!(metrics.snapshot(0).avg_response_time_ms, 1.0);
    }

    #[test]
    fn test_reset_clears_counters() {
        let metrics = RequestMetrics::new();
        metrics.record("/", 200, 5.0);
        metrics.reset();

        let snap = metrics.snapshot(3);
        assert_eq!(snap.requests_total, 0);
        assert!(snap.requests_by_endpoint.is_empty());
        assert_eq!(snap.avg_response_time_ms, 0.0);
        assert_eq!(snap.websocket_connections, 3);
    }
}
