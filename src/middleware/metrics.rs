use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use super::Middleware;
use crate::dispatcher::{HandlerRequest, HandlerResponse};

/// Request counters for the endpoints it wraps.
///
/// All counters use relaxed atomics; readings are approximate under concurrency.
#[derive(Default)]
pub struct MetricsMiddleware {
    request_count: AtomicUsize,
    response_count: AtomicUsize,
    error_responses: AtomicUsize,
    total_latency_ns: AtomicU64,
}

impl MetricsMiddleware {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests that entered a wrapped endpoint
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Responses observed on the way out (declines and failures are not responses)
    #[must_use]
    pub fn response_count(&self) -> usize {
        self.response_count.load(Ordering::Relaxed)
    }

    /// Responses with a 4xx or 5xx status
    #[must_use]
    pub fn error_responses(&self) -> usize {
        self.error_responses.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn average_latency(&self) -> Duration {
        let count = self.response_count.load(Ordering::Relaxed) as u64;
        if count == 0 {
            Duration::from_nanos(0)
        } else {
            Duration::from_nanos(self.total_latency_ns.load(Ordering::Relaxed) / count)
        }
    }
}

impl Middleware for MetricsMiddleware {
    fn before(&self, _req: &HandlerRequest) -> Option<HandlerResponse> {
        self.request_count.fetch_add(1, Ordering::Relaxed);
        None
    }

    fn after(&self, _req: &HandlerRequest, res: &mut HandlerResponse, latency: Duration) {
        self.response_count.fetch_add(1, Ordering::Relaxed);
        if res.status >= 400 {
            self.error_responses.fetch_add(1, Ordering::Relaxed);
        }
        self.total_latency_ns
            .fetch_add(latency.as_nanos() as u64, Ordering::Relaxed);
    }
}
