//! # route-dispatch
//!
//! **route-dispatch** is the request-dispatch layer that sits between declarative,
//! per-path and per-method route data and a path-matching router.
//!
//! ## Overview
//!
//! Route data for a path template is compiled once into a fixed [`MethodTable`] (nine
//! HTTP verbs plus a wildcard `Any` slot). At request time the [`Dispatcher`] asks its
//! [`PathMatcher`] for a match, picks the endpoint for the request method, runs its
//! handler and falls back to a default handler when the endpoint declines. The
//! [`DefaultResponses`] classifier turns what is left into `404`, `405` or `406`.
//!
//! ## Architecture
//!
//! - **[`route_data`]** - shared / per-verb route blocks, deep merge, YAML/JSON route files
//! - **[`endpoint`]** - compiles route data into a [`MethodTable`] of [`Endpoint`]s
//! - **[`router`]** - the [`PathMatcher`] seam, a radix-tree [`Router`] and a hot-swappable
//!   [`SharedRouter`]
//! - **[`handler`]** - the [`Handler`] trait with immediate and continuation shapes,
//!   the `Declined` sentinel and coroutine-backed handlers
//! - **[`chain`]** - [`FallbackChain`], first non-declining handler wins
//! - **[`dispatcher`]** - request/response types and the [`Dispatcher`]
//! - **[`defaults`]** - terminal 404 / 405 / 406 handlers
//! - **[`middleware`]** - handler wrappers (tracing, static token auth, counters)
//! - **[`registry`]** - named handlers and middleware for route files
//! - **[`logging`]**, **[`config`]** - environment-driven runtime setup
//!
//! ### Request Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Caller
//!     participant D as Dispatcher
//!     participant R as PathMatcher
//!     participant E as Endpoint handler
//!     participant F as Default handler
//!
//!     Caller->>D: dispatch(request)
//!     D->>R: match_by_path(uri)
//!     alt no match
//!         D->>F: raw request
//!         F-->>Caller: 404
//!     else match
//!         D->>D: table[method] or table[Any]
//!         D->>E: augmented request
//!         alt responds or fails
//!             E-->>Caller: response / error
//!         else declines
//!             D->>F: augmented request
//!             F-->>Caller: 405 or 406
//!         end
//!     end
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use http::Method;
//! use route_dispatch::{
//!     respond, DefaultResponses, Dispatcher, HandlerRequest, HandlerResponse, MethodKey,
//!     RouteBlock, RouteData, Router,
//! };
//!
//! let routes = vec![(
//!     "/pets/{id}".to_string(),
//!     RouteData::new().method(
//!         MethodKey::Get,
//!         RouteBlock::new().with_handler(respond(|req| {
//!             let id = req.get_path_param("id").unwrap_or_default().to_string();
//!             HandlerResponse::json(200, serde_json::json!({ "id": id }))
//!         })),
//!     ),
//! )];
//!
//! let dispatcher = Dispatcher::new(Arc::new(Router::new(routes)))
//!     .with_default_handler(Arc::new(DefaultResponses::new()));
//!
//! let outcome = dispatcher
//!     .dispatch(HandlerRequest::new(Method::GET, "/pets/7"))
//!     .unwrap();
//! let response = outcome.into_response().unwrap();
//! assert_eq!(response.body["id"], "7");
//! ```
//!
//! ## Failures
//!
//! A failing handler is not a declining handler: its [`HandlerError`] reaches the caller
//! through `Err` (immediate shape) or the continuation's failure side, and no fallback
//! runs.

pub mod chain;
pub mod cli;
pub mod config;
pub mod defaults;
pub mod dispatcher;
pub mod echo;
pub mod endpoint;
pub mod handler;
pub mod ids;
pub mod logging;
pub mod middleware;
pub mod registry;
pub mod route_data;
pub mod router;

pub use chain::FallbackChain;
pub use defaults::{classify, DefaultResponseOptions, DefaultResponses, Unhandled};
pub use dispatcher::{Dispatcher, HandlerRequest, HandlerResponse, RouteContext};
pub use endpoint::{compile, CompileOptions, Endpoint, MethodTable};
pub use handler::{
    block_on, decline, respond, Continuation, CoroutineHandler, Handler, HandlerError,
    HandlerResult, Outcome,
};
pub use registry::HandlerRegistry;
pub use route_data::{load_routes, MethodKey, RouteBlock, RouteData};
pub use router::{Match, PathMatcher, Router, SharedRouter};
