//! # Dispatcher Module
//!
//! Request-time half of the crate: the [`Dispatcher`] takes a request, asks its
//! [`PathMatcher`](crate::router::PathMatcher) for a match, picks the endpoint for the
//! request method (falling back to the `Any` slot) and runs it ahead of a default
//! handler.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use http::Method;
//! use route_dispatch::defaults::DefaultResponses;
//! use route_dispatch::dispatcher::{Dispatcher, HandlerRequest, HandlerResponse};
//! use route_dispatch::handler::respond;
//! use route_dispatch::route_data::{MethodKey, RouteBlock, RouteData};
//! use route_dispatch::router::Router;
//!
//! let router = Router::new(vec![(
//!     "/items".to_string(),
//!     RouteData::new().method(
//!         MethodKey::Get,
//!         RouteBlock::new().with_handler(respond(|_req| HandlerResponse::status_only(200))),
//!     ),
//! )]);
//! let dispatcher = Dispatcher::new(Arc::new(router))
//!     .with_default_handler(Arc::new(DefaultResponses::new()));
//!
//! let status = |method: Method, uri: &str| {
//!     dispatcher
//!         .dispatch(HandlerRequest::new(method, uri))
//!         .ok()
//!         .and_then(|o| o.into_response())
//!         .map(|r| r.status)
//! };
//! assert_eq!(status(Method::GET, "/items"), Some(200));
//! assert_eq!(status(Method::DELETE, "/items"), Some(405));
//! assert_eq!(status(Method::GET, "/missing"), Some(404));
//! ```
//!
//! ## Failure handling
//!
//! Handler failures are never turned into responses here. They come back as
//! `Err(HandlerError)` from [`Dispatcher::dispatch`] or through the failure side of the
//! continuation given to [`Dispatcher::dispatch_async`].

use smallvec::SmallVec;
use std::sync::Arc;

mod core;
pub(crate) mod request;
mod response;

pub use core::Dispatcher;
pub use request::{HandlerRequest, RouteContext};
pub use response::HandlerResponse;

/// Maximum inline headers before heap allocation
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header storage; names are `Arc<str>` since they repeat across requests.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;
