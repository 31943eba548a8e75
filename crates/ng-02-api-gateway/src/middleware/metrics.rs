//! Gateway counters, served as JSON on `/metrics`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Node gateway metrics
#[derive(Debug, Default)]
pub struct GatewayMetrics {
    // Proxied upstream calls
    pub proxy_requests_total: AtomicU64,
    pub proxy_requests_success: AtomicU64,
    pub proxy_requests_error: AtomicU64,
    pub proxy_route_misses: AtomicU64,

    // Supervisor lifecycle
    pub restarts_total: AtomicU64,
    pub lifecycle_failures: AtomicU64,
    pub process_faults: AtomicU64,

    // Settings writes
    pub settings_saved: AtomicU64,
    pub settings_rejected: AtomicU64,

    // Latency tracking (proxy calls only)
    pub total_latency_ms: AtomicU64,
    pub request_count_for_latency: AtomicU64,
}

impl GatewayMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a proxied call. `success` means the upstream answered, whatever
    /// its status.
    pub fn record_proxy(&self, success: bool, latency_ms: u64) {
        self.proxy_requests_total.fetch_add(1, Ordering::Relaxed);
        if success {
            self.proxy_requests_success.fetch_add(1, Ordering::Relaxed);
        } else {
            self.proxy_requests_error.fetch_add(1, Ordering::Relaxed);
        }
        self.total_latency_ms.fetch_add(latency_ms, Ordering::Relaxed);
        self.request_count_for_latency.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a path that matched no upstream, or a disallowed method.
    pub fn record_route_miss(&self) {
        self.proxy_route_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_restart(&self) {
        self.restarts_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a lifecycle operation that ended in an error response, plus
    /// how many per-process faults it carried.
    pub fn record_lifecycle_failure(&self, faults: usize) {
        self.lifecycle_failures.fetch_add(1, Ordering::Relaxed);
        self.process_faults.fetch_add(faults as u64, Ordering::Relaxed);
    }

    /// Record per-process faults that were logged but did not fail the call.
    pub fn record_process_faults(&self, faults: usize) {
        self.process_faults.fetch_add(faults as u64, Ordering::Relaxed);
    }

    pub fn record_settings_save(&self, success: bool) {
        if success {
            self.settings_saved.fetch_add(1, Ordering::Relaxed);
        } else {
            self.settings_rejected.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Get average proxy latency in ms
    pub fn average_latency_ms(&self) -> f64 {
        let total = self.total_latency_ms.load(Ordering::Relaxed);
        let count = self.request_count_for_latency.load(Ordering::Relaxed);
        if count == 0 {
            0.0
        } else {
            total as f64 / count as f64
        }
    }

    /// Export metrics as JSON
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "proxy": {
                "total": self.proxy_requests_total.load(Ordering::Relaxed),
                "success": self.proxy_requests_success.load(Ordering::Relaxed),
                "error": self.proxy_requests_error.load(Ordering::Relaxed),
                "route_misses": self.proxy_route_misses.load(Ordering::Relaxed),
            },
            "lifecycle": {
                "restarts": self.restarts_total.load(Ordering::Relaxed),
                "failures": self.lifecycle_failures.load(Ordering::Relaxed),
                "process_faults": self.process_faults.load(Ordering::Relaxed),
            },
            "settings": {
                "saved": self.settings_saved.load(Ordering::Relaxed),
                "rejected": self.settings_rejected.load(Ordering::Relaxed),
            },
            "latency": {
                "average_ms": self.average_latency_ms(),
            }
        })
    }
}

/// Proxy call timing helper
pub struct RequestTimer {
    start: Instant,
    metrics: Arc<GatewayMetrics>,
}

impl RequestTimer {
    pub fn new(metrics: Arc<GatewayMetrics>) -> Self {
        Self {
            start: Instant::now(),
            metrics,
        }
    }

    pub fn finish(self, success: bool) {
        let latency_ms = self.start.elapsed().as_millis() as u64;
        self.metrics.record_proxy(success, latency_ms);
    }
}
