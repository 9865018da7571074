use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::info;

use super::core::{Match, PathMatcher, Router};

/// A [`Router`] that can be replaced while requests are in flight.
///
/// Lookups load the current router; requests already holding a [`Match`] keep the tables
/// of the router they matched against.
pub struct SharedRouter {
    current: ArcSwap<Router>,
}

impl SharedRouter {
    #[must_use]
    pub fn new(router: Router) -> Self {
        Self {
            current: ArcSwap::from_pointee(router),
        }
    }

    /// Snapshot of the current router.
    #[must_use]
    pub fn load(&self) -> Arc<Router> {
        self.current.load_full()
    }

    /// Install a new route set, returning the previous one.
    pub fn swap(&self, router: Router) -> Arc<Router> {
        info!(routes_count = router.len(), "Swapping route set");
        self.current.swap(Arc::new(router))
    }
}

impl PathMatcher for SharedRouter {
    fn match_by_path(&self, uri: &str) -> Option<Match> {
        self.current.load().route(uri)
    }

    fn route_templates(&self) -> Vec<Arc<str>> {
        self.current.load().route_templates()
    }
}

impl std::fmt::Debug for SharedRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SharedRouter").field(&self.current.load()).finish()
    }
}
