use anyhow::Context;
use may::coroutine;
use may::sync::{mpsc, Mutex};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

use super::core::{Continuation, Handler, HandlerError, HandlerResult};
use crate::dispatcher::HandlerRequest;

type HandlerFn = dyn Fn(HandlerRequest) -> HandlerResult + Send + Sync;
type Job = (HandlerRequest, Continuation);

/// Handler whose continuation shape runs on a dedicated `may` coroutine.
///
/// Continuation calls are queued on an mpsc channel and served in order by the
/// coroutine, which resolves each continuation with the function's result. A panic in
/// the function is caught and delivered as [`HandlerError::Panicked`]. The immediate
/// shape runs the function on the caller's thread.
///
/// Dropping the handler closes the channel and the coroutine exits.
pub struct CoroutineHandler {
    name: Arc<str>,
    func: Arc<HandlerFn>,
    tx: Mutex<mpsc::Sender<Job>>,
}

impl CoroutineHandler {
    /// Spawn the serving coroutine for `func`.
    ///
    /// # Safety
    ///
    /// This calls `may::coroutine::Builder::spawn()`, which is unsafe in the `may`
    /// runtime. The caller must ensure the runtime is configured before handlers are
    /// spawned and that `func` does not block the coroutine on non-`may` primitives
    /// for long periods.
    pub unsafe fn spawn<F>(name: &str, stack_size: usize, func: F) -> anyhow::Result<Self>
    where
        F: Fn(HandlerRequest) -> HandlerResult + Send + Sync + 'static,
    {
        let (tx, rx) = mpsc::channel::<Job>();
        let func: Arc<HandlerFn> = Arc::new(func);
        let worker_fn = Arc::clone(&func);
        let worker_name: Arc<str> = Arc::from(name);
        let name_for_worker = Arc::clone(&worker_name);

        // SAFETY: forwarded to the caller through this function's contract. The closure
        // only owns `Send + 'static` data.
        unsafe {
            coroutine::Builder::new()
                .name(name.to_string())
                .stack_size(stack_size)
                .spawn(move || {
                    debug!(handler_name = %name_for_worker, stack_size, "Handler coroutine start");
                    for (req, k) in rx.iter() {
                        let request_id = req.request_id;
                        let started = Instant::now();
                        let result = run_guarded(&name_for_worker, &worker_fn, req);
                        info!(
                            request_id = %request_id,
                            handler_name = %name_for_worker,
                            execution_time_us = started.elapsed().as_micros() as u64,
                            ok = result.is_ok(),
                            "Handler execution complete"
                        );
                        k.resolve(result);
                    }
                    debug!(handler_name = %name_for_worker, "Handler coroutine exit");
                })
        }
        .with_context(|| format!("failed to spawn coroutine for handler '{name}'"))?;

        Ok(Self {
            name: worker_name,
            func,
            tx: Mutex::new(tx),
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

fn run_guarded(name: &str, func: &Arc<HandlerFn>, req: HandlerRequest) -> HandlerResult {
    let request_id = req.request_id;
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| func(req))) {
        Ok(result) => result,
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            error!(
                request_id = %request_id,
                handler_name = %name,
                panic_message = %message,
                "Handler panicked"
            );
            Err(HandlerError::Panicked(message))
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

impl Handler for CoroutineHandler {
    fn call(&self, req: HandlerRequest) -> HandlerResult {
        (self.func)(req)
    }

    fn call_async(&self, req: HandlerRequest, k: Continuation) {
        let sent = match self.tx.lock() {
            Ok(tx) => tx.send((req, k)),
            Err(poisoned) => poisoned.into_inner().send((req, k)),
        };
        if let Err(std::sync::mpsc::SendError((req, k))) = sent {
            error!(
                request_id = %req.request_id,
                handler_name = %self.name,
                "Handler coroutine is gone"
            );
            k.fail(HandlerError::Unavailable(self.name.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::HandlerResponse;
    use crate::handler::{block_on, Outcome};
    use http::Method;
    use serde_json::json;

    #[test]
    fn test_coroutine_handler_serves_continuations() {
        let h = unsafe {
            CoroutineHandler::spawn("echo_path", 0x8000, |req: HandlerRequest| {
                Ok(Outcome::Respond(HandlerResponse::json(
                    200,
                    json!({ "path": req.path() }),
                )))
            })
        }
        .unwrap();

        let resp = block_on(&h, HandlerRequest::new(Method::GET, "/pets/7"))
            .unwrap()
            .into_response()
            .unwrap();
        assert_eq!(resp.body, json!({ "path": "/pets/7" }));
        assert_eq!(h.name(), "echo_path");
    }

    #[test]
    fn test_closed_queue_reports_unavailable() {
        let (tx, rx) = mpsc::channel::<Job>();
        drop(rx);
        let h = CoroutineHandler {
            name: Arc::from("gone"),
            func: Arc::new(|_req: HandlerRequest| -> HandlerResult { Ok(Outcome::Declined) }),
            tx: Mutex::new(tx),
        };
        assert_eq!(
            block_on(&h, HandlerRequest::new(Method::GET, "/")),
            Err(HandlerError::Unavailable("gone".to_string()))
        );
        // the immediate shape does not go through the queue
        assert_eq!(h.call(HandlerRequest::new(Method::GET, "/")), Ok(Outcome::Declined));
    }

    #[test]
    fn test_panic_becomes_failure() {
        let func: Arc<HandlerFn> = Arc::new(|_req: HandlerRequest| -> HandlerResult {
            panic!("kaboom")
        });
        let result = run_guarded("explodes", &func, HandlerRequest::new(Method::GET, "/"));
        assert_eq!(result, Err(HandlerError::Panicked("kaboom".to_string())));
    }
}
