//! # Router Module
//!
//! Path matching for the dispatcher. The dispatcher only sees the [`PathMatcher`] seam;
//! [`Router`] is the shipped radix-tree implementation and [`SharedRouter`] lets a new
//! route set be swapped in atomically.
//!
//! ## Example
//!
//! ```rust
//! use route_dispatch::handler::respond;
//! use route_dispatch::dispatcher::HandlerResponse;
//! use route_dispatch::route_data::RouteData;
//! use route_dispatch::router::{PathMatcher, Router};
//!
//! let router = Router::new(vec![(
//!     "/pets/{id}".to_string(),
//!     RouteData::handler(respond(|_req| HandlerResponse::status_only(200))),
//! )]);
//!
//! let m = router.match_by_path("/pets/42?verbose=1").unwrap();
//! assert_eq!(m.template.as_ref(), "/pets/{id}");
//! assert_eq!(m.get_path_param("id"), Some("42"));
//! ```

mod core;
mod radix;
mod shared;

pub use core::{Match, PathMatcher, Router, ParamVec, MAX_INLINE_PARAMS};
pub use shared::SharedRouter;
