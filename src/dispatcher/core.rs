//! Dispatcher core module - hot path for request dispatch.

#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]
#![deny(clippy::unnecessary_to_owned)]

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use super::HandlerRequest;
use crate::chain::{call_links, run_link};
use crate::ids::RequestId;
use crate::handler::{decline, Continuation, Handler, HandlerError, HandlerResult};
use crate::router::PathMatcher;

/// Resolves requests against a [`PathMatcher`] and runs the matched handler, falling
/// back to a default handler.
///
/// Both invocation shapes resolve the same way:
///
/// 1. no match: the default handler gets the raw request;
/// 2. otherwise the method slot (or `Any`) of the match is looked up, the request is
///    augmented with the path params and a [`RouteContext`](super::RouteContext);
/// 3. the chain `[endpoint handler, default handler]` runs on the augmented request.
///    A missing endpoint handler leaves only the default handler.
pub struct Dispatcher {
    router: Arc<dyn PathMatcher>,
    default_handler: Arc<dyn Handler>,
}

/// Result of resolving a request: the request to hand on and the handler to try
/// before the default one.
struct Resolved {
    req: HandlerRequest,
    handler: Option<Arc<dyn Handler>>,
}

impl Dispatcher {
    /// A dispatcher whose default handler always declines.
    #[must_use]
    pub fn new(router: Arc<dyn PathMatcher>) -> Self {
        Self {
            router,
            default_handler: Arc::new(decline()),
        }
    }

    #[must_use]
    pub fn with_default_handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.default_handler = handler;
        self
    }

    #[must_use]
    pub fn router(&self) -> &Arc<dyn PathMatcher> {
        &self.router
    }

    fn resolve(&self, req: HandlerRequest) -> Resolved {
        let Some(route_match) = self.router.match_by_path(&req.uri) else {
            debug!(
                request_id = %req.request_id,
                path = %req.path(),
                "No route match, using default handler"
            );
            return Resolved { req, handler: None };
        };

        let method = req.method_key();
        let handler = route_match
            .methods
            .resolve(method)
            .and_then(|endpoint| endpoint.handler.clone())
            .filter(|h| !Arc::ptr_eq(h, &self.default_handler));

        debug!(
            request_id = %req.request_id,
            template = %route_match.template,
            method = %method,
            has_handler = handler.is_some(),
            "Route resolved"
        );

        let req = req.with_route(route_match, Arc::clone(&self.router));
        Resolved { req, handler }
    }

    /// Dispatch on the caller's thread.
    pub fn dispatch(&self, req: HandlerRequest) -> HandlerResult {
        let Resolved { req, handler } = self.resolve(req);
        let request_id = req.request_id;
        let result = match handler {
            Some(handler) => call_links(&[handler, Arc::clone(&self.default_handler)], req),
            None => self.default_handler.call(req),
        };
        if let Err(err) = &result {
            log_failure(request_id, err);
        }
        result
    }

    /// Dispatch and report through `k`; exactly one of its callbacks runs, once.
    pub fn dispatch_async(&self, req: HandlerRequest, k: Continuation) {
        let Resolved { req, handler } = self.resolve(req);
        let request_id = req.request_id;
        let k = Continuation::from_fn(move |result: HandlerResult| {
            if let Err(err) = &result {
                log_failure(request_id, err);
            }
            k.resolve(result);
        });
        match handler {
            Some(handler) => run_link(
                Arc::from(vec![handler, Arc::clone(&self.default_handler)]),
                0,
                req,
                k,
            ),
            None => self.default_handler.call_async(req, k),
        }
    }
}

fn log_failure(request_id: RequestId, err: &HandlerError) {
    warn!(request_id = %request_id, error = %err, "Handler failed during dispatch");
}

impl Handler for Dispatcher {
    fn call(&self, req: HandlerRequest) -> HandlerResult {
        self.dispatch(req)
    }

    fn call_async(&self, req: HandlerRequest, k: Continuation) {
        self.dispatch_async(req, k);
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("routes", &self.router.route_templates())
            .finish_non_exhaustive()
    }
}
