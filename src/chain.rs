//! Fallback chains: several handlers presented as one.
//!
//! Links are tried in order with the same request. The first link that does not decline
//! decides the outcome; a failing link stops the chain and its error is reported as is.
//! In the continuation shape link N+1 is only started from link N's decline, so links
//! never overlap.

use std::fmt;
use std::sync::Arc;

use crate::dispatcher::HandlerRequest;
use crate::handler::{Continuation, Handler, HandlerResult, Outcome};

/// Ordered handlers behaving as a single [`Handler`].
///
/// An empty chain declines.
#[derive(Clone)]
pub struct FallbackChain {
    handlers: Arc<[Arc<dyn Handler>]>,
}

impl FallbackChain {
    #[must_use]
    pub fn new(handlers: Vec<Arc<dyn Handler>>) -> Self {
        Self {
            handlers: handlers.into(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for FallbackChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FallbackChain")
            .field("links", &self.handlers.len())
            .finish()
    }
}

/// Immediate evaluation of a chain over borrowed links.
pub(crate) fn call_links(handlers: &[Arc<dyn Handler>], req: HandlerRequest) -> HandlerResult {
    let Some((last, rest)) = handlers.split_last() else {
        return Ok(Outcome::Declined);
    };
    for handler in rest {
        match handler.call(req.clone())? {
            Outcome::Declined => continue,
            outcome => return Ok(outcome),
        }
    }
    last.call(req)
}

/// Continuation evaluation starting at link `idx`.
pub(crate) fn run_link(
    handlers: Arc<[Arc<dyn Handler>]>,
    idx: usize,
    req: HandlerRequest,
    k: Continuation,
) {
    let Some(handler) = handlers.get(idx).map(Arc::clone) else {
        k.succeed(Outcome::Declined);
        return;
    };
    if idx + 1 == handlers.len() {
        handler.call_async(req, k);
        return;
    }
    let retry = req.clone();
    handler.call_async(
        req,
        Continuation::from_fn(move |result| match result {
            Ok(Outcome::Declined) => run_link(handlers, idx + 1, retry, k),
            other => k.resolve(other),
        }),
    );
}

impl Handler for FallbackChain {
    fn call(&self, req: HandlerRequest) -> HandlerResult {
        call_links(&self.handlers, req)
    }

    fn call_async(&self, req: HandlerRequest, k: Continuation) {
        run_link(Arc::clone(&self.handlers), 0, req, k);
    }
}
