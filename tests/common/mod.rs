#![allow(dead_code)]

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use http::Method;
use route_dispatch::dispatcher::{HandlerRequest, HandlerResponse};
use route_dispatch::handler::{respond, Handler, HandlerError, HandlerResult, Outcome};

pub fn get(uri: &str) -> HandlerRequest {
    HandlerRequest::new(Method::GET, uri)
}

pub fn status(code: u16) -> Arc<dyn Handler> {
    Arc::new(respond(move |_req| HandlerResponse::status_only(code)))
}

pub fn status_of(result: &HandlerResult) -> Option<u16> {
    match result {
        Ok(Outcome::Respond(resp)) => Some(resp.status),
        _ => None,
    }
}

pub fn failing(message: &'static str) -> Arc<dyn Handler> {
    Arc::new(move |_req: HandlerRequest| -> HandlerResult { Err(HandlerError::failed(message)) })
}

/// Records the order in which handlers are entered.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<&'static str>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<&'static str> {
        self.0.lock().unwrap().clone()
    }

    /// A handler that logs `name` and then behaves like `inner`.
    pub fn wrap(&self, name: &'static str, inner: Arc<dyn Handler>) -> Arc<dyn Handler> {
        let log = Arc::clone(&self.0);
        Arc::new(move |req: HandlerRequest| -> HandlerResult {
            log.lock().unwrap().push(name);
            inner.call(req)
        })
    }
}

/// Counts invocations and then behaves like `inner`.
pub struct Counting {
    calls: AtomicUsize,
    inner: Arc<dyn Handler>,
}

impl Counting {
    pub fn new(inner: Arc<dyn Handler>) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            inner,
        })
    }

    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Handler for Counting {
    fn call(&self, req: HandlerRequest) -> HandlerResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.call(req)
    }
}

pub mod temp_files {
    use super::*;

    /// Route file with the given extension; removed when the handle drops.
    pub fn route_file(content: &str, ext: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .prefix("routes_")
            .suffix(&format!(".{ext}"))
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }
}
