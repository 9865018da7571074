//! # Route Data Module
//!
//! Declarative configuration for one path template, tagged once into a shared block
//! and per-verb blocks.
//!
//! ## Shape
//!
//! A [`RouteData`] holds a shared [`RouteBlock`] that applies to every method plus an
//! optional block per [`MethodKey`]. Blocks carry a handler, a middleware list and an
//! open-ended JSON config map. The endpoint compiler merges the shared block into each
//! verb block with [`merge_blocks`] (verb-specific data wins).
//!
//! ## Route Files
//!
//! [`load_routes`] reads the same structure from YAML or JSON, resolving handler and
//! middleware names through a [`HandlerRegistry`](crate::registry::HandlerRegistry):
//!
//! ```yaml
//! routes:
//!   /items:
//!     owner: inventory
//!     get:
//!       handler: list_items
//!     post:
//!       handler: create_item
//!       middleware: [auth]
//! ```

mod load;
mod merge;
mod types;

pub use load::{
    load_routes, parse_routes, read_route_document, referenced_names, ReferencedNames,
    RouteDataError,
};
pub use merge::{deep_merge, merge_blocks};
pub use types::{MethodKey, RouteBlock, RouteData};
