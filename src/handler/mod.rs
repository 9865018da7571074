//! # Handler Module
//!
//! A handler turns a [`HandlerRequest`](crate::dispatcher::HandlerRequest) into an
//! [`Outcome`]: either a concrete response or an explicit decline that tells the caller
//! to try the next fallback.
//!
//! ## Invocation Shapes
//!
//! Every [`Handler`] can be driven two ways:
//!
//! - **Immediate** - [`Handler::call`] returns the outcome on the caller's thread.
//! - **Continuation** - [`Handler::call_async`] delivers the outcome (or a failure) to a
//!   single-use [`Continuation`]. Exactly one of success/failure fires, exactly once.
//!
//! Plain functions only implement `call`; the default `call_async` forwards the result.
//! Continuation-native handlers ([`Deferred`], [`CoroutineHandler`]) get their immediate
//! shape from [`block_on`], which parks on a `may` channel until the continuation resolves.
//!
//! ## Example
//!
//! ```rust
//! use route_dispatch::dispatcher::{HandlerRequest, HandlerResponse};
//! use route_dispatch::handler::{respond, Handler, Outcome};
//! use http::Method;
//!
//! let hello = respond(|_req| HandlerResponse::json(200, serde_json::json!({"hello": "world"})));
//! let outcome = hello.call(HandlerRequest::new(Method::GET, "/")).unwrap();
//! assert!(matches!(outcome, Outcome::Respond(r) if r.status == 200));
//! ```

mod core;
mod coroutine;

pub use self::core::{
    block_on, decline, deferred, respond, Continuation, Deferred, Handler, HandlerError,
    HandlerResult, Outcome, SharedHandler,
};
pub use self::coroutine::CoroutineHandler;
