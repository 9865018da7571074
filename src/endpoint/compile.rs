use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::handler::Handler;
use crate::middleware::{layer, Middleware};
use crate::route_data::{merge_blocks, MethodKey, RouteBlock, RouteData};

/// Rewrites a per-method block before it is merged over the shared block.
pub type ExpandFn = Arc<dyn Fn(MethodKey, &RouteBlock) -> RouteBlock + Send + Sync>;

/// Combines `(shared, method)` blocks; the method block takes precedence.
pub type MergeFn = Arc<dyn Fn(&RouteBlock, &RouteBlock) -> RouteBlock + Send + Sync>;

/// Compiled, immutable binding of a path template (and optionally one verb) to merged
/// route data and its handler.
pub struct Endpoint {
    /// Merged route data this endpoint was built from
    pub data: RouteBlock,
    /// Handler wrapped in [`Endpoint::middleware`]; `None` when the data names none
    pub handler: Option<Arc<dyn Handler>>,
    pub path: Arc<str>,
    /// `None` for the endpoint built from shared data
    pub method: Option<MethodKey>,
    pub middleware: Vec<Arc<dyn Middleware>>,
}

impl Endpoint {
    fn build(path: &Arc<str>, data: RouteBlock, method: Option<MethodKey>) -> Self {
        let middleware = data.middleware.clone();
        let handler = data
            .handler
            .as_ref()
            .map(|h| layer(Arc::clone(h), &middleware));
        Self {
            data,
            handler,
            path: Arc::clone(path),
            method,
            middleware,
        }
    }

    #[must_use]
    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("path", &self.path)
            .field("method", &self.method)
            .field("has_handler", &self.handler.is_some())
            .field("middleware", &self.middleware.len())
            .field("config", &self.data.config)
            .finish()
    }
}

/// Fixed table with one slot per [`MethodKey`].
#[derive(Clone, Default)]
pub struct MethodTable {
    slots: [Option<Arc<Endpoint>>; 10],
}

impl MethodTable {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Endpoint stored in exactly this slot.
    #[inline]
    #[must_use]
    pub fn get(&self, key: MethodKey) -> Option<&Arc<Endpoint>> {
        self.slots[key.index()].as_ref()
    }

    pub(crate) fn set(&mut self, key: MethodKey, endpoint: Arc<Endpoint>) {
        self.slots[key.index()] = Some(endpoint);
    }

    /// Endpoint for `key`, falling back to the `Any` slot when that slot is empty.
    #[inline]
    #[must_use]
    pub fn resolve(&self, key: MethodKey) -> Option<&Arc<Endpoint>> {
        self.get(key).or_else(|| self.get(MethodKey::Any))
    }

    pub fn iter(&self) -> impl Iterator<Item = (MethodKey, &Arc<Endpoint>)> + '_ {
        MethodKey::ALL
            .iter()
            .filter_map(move |key| self.get(*key).map(|ep| (*key, ep)))
    }

    /// Verbs that resolve to an endpoint with a handler, `Any` fallback included.
    #[must_use]
    pub fn allowed_methods(&self) -> Vec<MethodKey> {
        MethodKey::VERBS
            .iter()
            .copied()
            .filter(|key| self.resolve(*key).is_some_and(|ep| ep.has_handler()))
            .collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}

impl fmt::Debug for MethodTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(key, ep)| (key.as_str(), ep.has_handler())))
            .finish()
    }
}

/// Hooks applied while compiling.
#[derive(Clone)]
pub struct CompileOptions {
    pub expand: ExpandFn,
    pub merge: MergeFn,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            expand: Arc::new(|_key: MethodKey, block: &RouteBlock| block.clone()),
            merge: Arc::new(merge_blocks),
        }
    }
}

impl CompileOptions {
    #[must_use]
    pub fn with_expand<F>(mut self, expand: F) -> Self
    where
        F: Fn(MethodKey, &RouteBlock) -> RouteBlock + Send + Sync + 'static,
    {
        self.expand = Arc::new(expand);
        self
    }

    #[must_use]
    pub fn with_merge<F>(mut self, merge: F) -> Self
    where
        F: Fn(&RouteBlock, &RouteBlock) -> RouteBlock + Send + Sync + 'static,
    {
        self.merge = Arc::new(merge);
        self
    }
}

impl fmt::Debug for CompileOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompileOptions").finish_non_exhaustive()
    }
}

/// Compile the route data for `path` into a [`MethodTable`].
#[must_use]
pub fn compile(path: &str, data: &RouteData, options: &CompileOptions) -> MethodTable {
    let path: Arc<str> = Arc::from(path);
    let mut table = MethodTable::empty();

    if !data.has_methods() {
        let endpoint = Arc::new(Endpoint::build(&path, data.shared.clone(), None));
        for key in MethodKey::ALL {
            table.set(key, Arc::clone(&endpoint));
        }
        debug!(path = %path, shared = true, table = ?table, "Compiled method table");
        return table;
    }

    if data.shared.has_handler() {
        let endpoint = Arc::new(Endpoint::build(&path, data.shared.clone(), None));
        for key in MethodKey::ALL {
            table.set(key, Arc::clone(&endpoint));
        }
    }

    for (key, block) in &data.methods {
        let expanded = (options.expand)(*key, block);
        let merged = (options.merge)(&data.shared, &expanded);
        table.set(*key, Arc::new(Endpoint::build(&path, merged, Some(*key))));
    }

    debug!(
        path = %path,
        shared = false,
        overrides = data.methods.len(),
        table = ?table,
        "Compiled method table"
    );
    table
}
