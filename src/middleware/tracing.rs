use std::time::Duration;

use tracing::{debug, info};

use super::Middleware;
use crate::dispatcher::{HandlerRequest, HandlerResponse};

/// Emits one structured event when a request enters an endpoint and one when it
/// leaves with a response.
pub struct TracingMiddleware;

fn template(req: &HandlerRequest) -> &str {
    req.route_match().map_or("<unmatched>", |m| m.template.as_ref())
}

impl Middleware for TracingMiddleware {
    fn before(&self, req: &HandlerRequest) -> Option<HandlerResponse> {
        debug!(
            request_id = %req.request_id,
            method = ?req.method,
            path = %req.path(),
            template = %template(req),
            path_params = ?req.path_params,
            "Request entering endpoint"
        );
        None
    }

    fn after(&self, req: &HandlerRequest, res: &mut HandlerResponse, latency: Duration) {
        info!(
            request_id = %req.request_id,
            method = ?req.method,
            template = %template(req),
            status = res.status,
            latency_us = latency.as_micros() as u64,
            "Endpoint responded"
        );
    }
}
