//! # Endpoint Compilation
//!
//! Turns the [`RouteData`](crate::route_data::RouteData) authored for one path template
//! into a [`MethodTable`]: one optional [`Endpoint`] per HTTP verb plus a wildcard `Any`
//! slot.
//!
//! - Route data without per-method blocks yields a single endpoint shared by every slot.
//! - Per-method blocks are merged over the shared block (method wins) and replace only
//!   their own slot. Remaining slots keep the shared endpoint when the shared block names
//!   a handler, otherwise they stay empty.
//!
//! Tables are built once and shared via `Arc`; nothing here runs per request.

mod compile;

pub use compile::{compile, CompileOptions, Endpoint, ExpandFn, MergeFn, MethodTable};
