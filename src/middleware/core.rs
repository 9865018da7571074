use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::dispatcher::{HandlerRequest, HandlerResponse};
use crate::handler::{Continuation, Handler, HandlerResult, Outcome};

pub trait Middleware: Send + Sync {
    fn before(&self, _req: &HandlerRequest) -> Option<HandlerResponse> {
        None
    }
    fn after(&self, _req: &HandlerRequest, _res: &mut HandlerResponse, _latency: Duration) {}
}

/// A handler wrapped in a fixed middleware stack.
pub struct Layered {
    middleware: Arc<[Arc<dyn Middleware>]>,
    inner: Arc<dyn Handler>,
}

/// Wrap `handler` in `middleware`, outermost first. An empty stack returns the handler
/// itself.
#[must_use]
pub fn layer(handler: Arc<dyn Handler>, middleware: &[Arc<dyn Middleware>]) -> Arc<dyn Handler> {
    if middleware.is_empty() {
        return handler;
    }
    Arc::new(Layered {
        middleware: middleware.iter().cloned().collect(),
        inner: handler,
    })
}

/// Run `before` hooks. Returns how many were entered and the short-circuit response,
/// if one was produced.
fn enter(
    middleware: &[Arc<dyn Middleware>],
    req: &HandlerRequest,
) -> (usize, Option<HandlerResponse>) {
    for (idx, mw) in middleware.iter().enumerate() {
        if let Some(resp) = mw.before(req) {
            debug!(
                request_id = %req.request_id,
                middleware_idx = idx,
                status = resp.status,
                "Middleware returned early response"
            );
            return (idx + 1, Some(resp));
        }
    }
    (middleware.len(), None)
}

fn leave(
    entered: &[Arc<dyn Middleware>],
    req: &HandlerRequest,
    result: &mut HandlerResult,
    latency: Duration,
) {
    if let Ok(Outcome::Respond(resp)) = result {
        for mw in entered.iter().rev() {
            mw.after(req, resp, latency);
        }
    }
}

impl Handler for Layered {
    fn call(&self, req: HandlerRequest) -> HandlerResult {
        let started = Instant::now();
        let (entered, early) = enter(&self.middleware, &req);
        let mut result = match early {
            Some(resp) => Ok(Outcome::Respond(resp)),
            None => self.inner.call(req.clone()),
        };
        leave(&self.middleware[..entered], &req, &mut result, started.elapsed());
        result
    }

    fn call_async(&self, req: HandlerRequest, k: Continuation) {
        let started = Instant::now();
        let (entered, early) = enter(&self.middleware, &req);
        if let Some(resp) = early {
            let mut result = Ok(Outcome::Respond(resp));
            leave(&self.middleware[..entered], &req, &mut result, started.elapsed());
            k.resolve(result);
            return;
        }

        let middleware = Arc::clone(&self.middleware);
        let observed = req.clone();
        self.inner.call_async(
            req,
            Continuation::from_fn(move |mut result| {
                leave(&middleware, &observed, &mut result, started.elapsed());
                k.resolve(result);
            }),
        );
    }
}
