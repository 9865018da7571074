//! Router core module - hot path for request routing.

#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]
#![deny(clippy::unnecessary_to_owned)]

use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::radix::{RadixTree, RouteEntry};
use crate::dispatcher::request::strip_query;
use crate::endpoint::{compile, CompileOptions, MethodTable};
use crate::route_data::RouteData;

/// Maximum number of path/query parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage for the hot path.
///
/// Param names are `Arc<str>` shared with the route tree; values are per-request data
/// from the URL.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Result of matching a request target against the route set.
#[derive(Clone)]
pub struct Match {
    /// The path template that matched (e.g. `/items/{id}`)
    pub template: Arc<str>,
    /// Path parameters in template order
    pub path_params: ParamVec,
    /// Compiled handlers for the template
    pub methods: Arc<MethodTable>,
}

impl Match {
    /// Get a path parameter by name ("last write wins" on duplicates)
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Note: This allocates - use get_path_param() in hot paths instead
    #[must_use]
    pub fn path_params_map(&self) -> HashMap<String, String> {
        self.path_params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

impl fmt::Debug for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Match")
            .field("template", &self.template)
            .field("path_params", &self.path_params)
            .field("methods", &self.methods)
            .finish()
    }
}

/// Anything that can map a request target to a [`Match`].
///
/// The dispatcher only depends on this trait; [`Router`] is the shipped implementation.
pub trait PathMatcher: Send + Sync {
    /// Match `uri` (query string and fragment allowed) against the route set.
    fn match_by_path(&self, uri: &str) -> Option<Match>;

    /// Every template the matcher knows about.
    fn route_templates(&self) -> Vec<Arc<str>> {
        Vec::new()
    }
}

/// Radix-tree path matcher over compiled method tables.
///
/// Each `(template, RouteData)` pair is compiled once at construction. Templates use
/// `{name}` segments for parameters. A template registered twice keeps the later data.
#[derive(Clone, Default)]
pub struct Router {
    tree: RadixTree,
    route_count: usize,
}

impl Router {
    /// Build a router compiling every entry with the default [`CompileOptions`].
    #[must_use]
    pub fn new(routes: Vec<(String, RouteData)>) -> Self {
        Self::with_options(routes, &CompileOptions::default())
    }

    #[must_use]
    pub fn with_options(routes: Vec<(String, RouteData)>, options: &CompileOptions) -> Self {
        Self::from_tables(
            routes
                .into_iter()
                .map(|(template, data)| {
                    let table = compile(&template, &data, options);
                    (template, table)
                })
                .collect(),
        )
    }

    /// Build from tables that were already compiled.
    #[must_use]
    pub fn from_tables(tables: Vec<(String, MethodTable)>) -> Self {
        let mut tree = RadixTree::default();
        let mut route_count = 0;
        for (template, table) in tables {
            let entry = RouteEntry {
                template: Arc::from(template.as_str()),
                methods: Arc::new(table),
            };
            if tree.insert(entry).is_some() {
                warn!(template = %template, "Duplicate route template, later definition wins");
            } else {
                route_count += 1;
            }
        }
        info!(routes_count = route_count, "Router loaded");
        Self { tree, route_count }
    }

    /// Match a request target; the query string and fragment are ignored.
    #[must_use]
    pub fn route(&self, uri: &str) -> Option<Match> {
        let path = strip_query(uri);
        match self.tree.search(path) {
            Some((entry, path_params)) => Some(Match {
                template: Arc::clone(&entry.template),
                path_params,
                methods: Arc::clone(&entry.methods),
            }),
            None => {
                debug!(path = %path, "No route matched");
                None
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.route_count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.route_count == 0
    }

    /// Templates with their method tables, sorted by template.
    #[must_use]
    pub fn routes(&self) -> Vec<(Arc<str>, Arc<MethodTable>)> {
        let mut routes: Vec<_> = self
            .tree
            .entries()
            .into_iter()
            .map(|e| (e.template, e.methods))
            .collect();
        routes.sort_by(|a, b| a.0.cmp(&b.0));
        routes
    }

    /// Print all registered routes to stdout
    pub fn dump_routes(&self) {
        println!("[routes] count={}", self.route_count);
        for (template, table) in self.routes() {
            let methods: Vec<String> = table
                .allowed_methods()
                .iter()
                .map(ToString::to_string)
                .collect();
            println!("[route] {template} -> {}", methods.join(","));
        }
    }
}

impl PathMatcher for Router {
    fn match_by_path(&self, uri: &str) -> Option<Match> {
        self.route(uri)
    }

    fn route_templates(&self) -> Vec<Arc<str>> {
        self.routes().into_iter().map(|(t, _)| t).collect()
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.route_templates())
            .finish()
    }
}
