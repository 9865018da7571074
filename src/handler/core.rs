use may::sync::mpsc;
use std::fmt;
use std::sync::Arc;

use crate::dispatcher::{HandlerRequest, HandlerResponse};

/// What a handler produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A concrete response; stops any fallback chain.
    Respond(HandlerResponse),
    /// The handler declines; the next fallback is tried.
    Declined,
}

impl Outcome {
    #[inline]
    #[must_use]
    pub fn is_declined(&self) -> bool {
        matches!(self, Outcome::Declined)
    }

    #[must_use]
    pub fn response(&self) -> Option<&HandlerResponse> {
        match self {
            Outcome::Respond(resp) => Some(resp),
            Outcome::Declined => None,
        }
    }

    #[must_use]
    pub fn into_response(self) -> Option<HandlerResponse> {
        match self {
            Outcome::Respond(resp) => Some(resp),
            Outcome::Declined => None,
        }
    }
}

impl From<HandlerResponse> for Outcome {
    fn from(resp: HandlerResponse) -> Self {
        Outcome::Respond(resp)
    }
}

/// A genuine handler failure. Declines are not errors and never show up here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// The handler reported a failure
    Failed(String),
    /// The handler panicked while running on a coroutine
    Panicked(String),
    /// A continuation was dropped without being resolved
    Abandoned,
    /// A coroutine-backed handler no longer accepts requests
    Unavailable(String),
}

impl HandlerError {
    pub fn failed(message: impl Into<String>) -> Self {
        HandlerError::Failed(message.into())
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerError::Failed(message) => write!(f, "handler failed: {message}"),
            HandlerError::Panicked(message) => write!(f, "handler panicked: {message}"),
            HandlerError::Abandoned => {
                write!(f, "handler dropped its continuation without resolving it")
            }
            HandlerError::Unavailable(name) => {
                write!(f, "handler '{name}' is not accepting requests")
            }
        }
    }
}

impl std::error::Error for HandlerError {}

impl From<anyhow::Error> for HandlerError {
    fn from(err: anyhow::Error) -> Self {
        HandlerError::Failed(format!("{err:#}"))
    }
}

pub type HandlerResult = Result<Outcome, HandlerError>;

type ResolveFn = Box<dyn FnOnce(HandlerResult) + Send>;

/// Single-use completion callback for the continuation shape.
///
/// Success and failure share one `FnOnce`, so resolving consumes the continuation and a
/// second resolution cannot be expressed. A continuation dropped unresolved reports
/// [`HandlerError::Abandoned`], so exactly one callback always runs.
pub struct Continuation {
    resolve: Option<ResolveFn>,
}

impl Continuation {
    /// Build from separate success and failure callbacks.
    pub fn new<S, F>(on_success: S, on_failure: F) -> Self
    where
        S: FnOnce(Outcome) + Send + 'static,
        F: FnOnce(HandlerError) + Send + 'static,
    {
        Self::from_fn(move |result| match result {
            Ok(outcome) => on_success(outcome),
            Err(err) => on_failure(err),
        })
    }

    pub fn from_fn<F>(f: F) -> Self
    where
        F: FnOnce(HandlerResult) + Send + 'static,
    {
        Self {
            resolve: Some(Box::new(f)),
        }
    }

    pub fn succeed(self, outcome: Outcome) {
        self.resolve(Ok(outcome));
    }

    pub fn fail(self, err: HandlerError) {
        self.resolve(Err(err));
    }

    pub fn resolve(mut self, result: HandlerResult) {
        if let Some(resolve) = self.resolve.take() {
            resolve(result);
        }
    }
}

impl Drop for Continuation {
    fn drop(&mut self) {
        if let Some(resolve) = self.resolve.take() {
            resolve(Err(HandlerError::Abandoned));
        }
    }
}

impl fmt::Debug for Continuation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Continuation")
    }
}

/// A request handler with an immediate and a continuation invocation shape.
pub trait Handler: Send + Sync {
    /// Handle the request on the caller's thread.
    fn call(&self, req: HandlerRequest) -> HandlerResult;

    /// Handle the request and report through `k`.
    fn call_async(&self, req: HandlerRequest, k: Continuation) {
        k.resolve(self.call(req));
    }
}

pub type SharedHandler = Arc<dyn Handler>;

impl<F> Handler for F
where
    F: Fn(HandlerRequest) -> HandlerResult + Send + Sync,
{
    fn call(&self, req: HandlerRequest) -> HandlerResult {
        self(req)
    }
}

/// Handler that always answers with the response built by `f`.
pub fn respond<F>(f: F) -> impl Handler
where
    F: Fn(HandlerRequest) -> HandlerResponse + Send + Sync,
{
    move |req: HandlerRequest| -> HandlerResult { Ok(Outcome::Respond(f(req))) }
}

/// Handler that always declines.
#[must_use]
pub fn decline() -> impl Handler {
    |_req: HandlerRequest| -> HandlerResult { Ok(Outcome::Declined) }
}

/// A continuation-native handler. Its immediate shape blocks until the continuation
/// resolves.
pub struct Deferred<F>(F);

pub fn deferred<F>(f: F) -> Deferred<F>
where
    F: Fn(HandlerRequest, Continuation) + Send + Sync,
{
    Deferred(f)
}

impl<F> Handler for Deferred<F>
where
    F: Fn(HandlerRequest, Continuation) + Send + Sync,
{
    fn call(&self, req: HandlerRequest) -> HandlerResult {
        block_on(self, req)
    }

    fn call_async(&self, req: HandlerRequest, k: Continuation) {
        (self.0)(req, k);
    }
}

/// Drive a handler's continuation shape and wait for its result.
///
/// Inside a `may` coroutine this parks the coroutine; on a plain thread it blocks the
/// thread. A continuation dropped without resolving yields [`HandlerError::Abandoned`].
pub fn block_on<H>(handler: &H, req: HandlerRequest) -> HandlerResult
where
    H: Handler + ?Sized,
{
    let (reply_tx, reply_rx) = mpsc::channel();
    handler.call_async(
        req,
        Continuation::from_fn(move |result| {
            // The receiver only goes away once we have stopped waiting.
            let _ = reply_tx.send(result);
        }),
    );
    reply_rx.recv().unwrap_or(Err(HandlerError::Abandoned))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn get(uri: &str) -> HandlerRequest {
        HandlerRequest::new(Method::GET, uri)
    }

    #[test]
    fn test_closure_default_call_async_forwards_result() {
        let h = respond(|req| HandlerResponse::json(200, json!({ "path": req.path() })));
        let result = block_on(&h, get("/a?b=c"));
        let resp = result.unwrap().into_response().unwrap();
        assert_eq!(resp.body, json!({ "path": "/a" }));
    }

    #[test]
    fn test_continuation_routes_success_and_failure() {
        let hits = Arc::new(AtomicUsize::new(0));
        let ok_hits = Arc::clone(&hits);
        let k = Continuation::new(
            move |outcome| {
                assert!(outcome.is_declined());
                ok_hits.fetch_add(1, Ordering::SeqCst);
            },
            |_err| panic!("failure callback must not run"),
        );
        decline().call_async(get("/"), k);
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        let failures = Arc::new(AtomicUsize::new(0));
        let fail_hits = Arc::clone(&failures);
        let failing = |_req: HandlerRequest| -> HandlerResult { Err(HandlerError::failed("boom")) };
        failing.call_async(
            get("/"),
            Continuation::new(
                |_outcome| panic!("success callback must not run"),
                move |err| {
                    assert_eq!(err, HandlerError::failed("boom"));
                    fail_hits.fetch_add(1, Ordering::SeqCst);
                },
            ),
        );
        assert_eq!(failures.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_deferred_immediate_shape_blocks_on_continuation() {
        let h = deferred(|req: HandlerRequest, k: Continuation| {
            std::thread::spawn(move || {
                k.succeed(Outcome::Respond(HandlerResponse::json(
                    202,
                    json!({ "uri": req.uri }),
                )));
            });
        });
        let resp = h.call(get("/later")).unwrap().into_response().unwrap();
        assert_eq!(resp.status, 202);
        assert_eq!(resp.body, json!({ "uri": "/later" }));
    }

    #[test]
    fn test_dropped_continuation_is_abandoned() {
        let h = deferred(|_req: HandlerRequest, k: Continuation| drop(k));
        assert_eq!(h.call(get("/")), Err(HandlerError::Abandoned));
    }

    #[test]
    fn test_drop_fires_failure_once_and_resolve_does_not_refire() {
        let successes = Arc::new(AtomicUsize::new(0));
        let failures = Arc::new(std::sync::Mutex::new(Vec::new()));
        let continuation = |successes: &Arc<AtomicUsize>, failures: &Arc<std::sync::Mutex<Vec<HandlerError>>>| {
            let successes = Arc::clone(successes);
            let failures = Arc::clone(failures);
            Continuation::new(
                move |_outcome| {
                    successes.fetch_add(1, Ordering::SeqCst);
                },
                move |err| failures.lock().unwrap().push(err),
            )
        };

        drop(continuation(&successes, &failures));
        continuation(&successes, &failures).succeed(Outcome::Declined);

        assert_eq!(successes.load(Ordering::SeqCst), 1);
        assert_eq!(*failures.lock().unwrap(), vec![HandlerError::Abandoned]);
    }

    #[test]
    fn test_anyhow_errors_convert_to_failed() {
        let err: HandlerError = anyhow::anyhow!("db down").context("loading item").into();
        assert_eq!(err, HandlerError::Failed("loading item: db down".to_string()));
    }
}
