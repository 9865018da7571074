//! Named handlers and middleware, used to resolve the string references in route files.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

use crate::handler::Handler;
use crate::middleware::Middleware;

#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn Handler>>,
    middleware: HashMap<String, Arc<dyn Middleware>>,
}

impl HandlerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under `name`, replacing any previous one.
    pub fn register(&mut self, name: &str, handler: impl Handler + 'static) {
        self.register_shared(name, Arc::new(handler));
    }

    pub fn register_shared(&mut self, name: &str, handler: Arc<dyn Handler>) {
        if self.handlers.insert(name.to_string(), handler).is_some() {
            warn!(handler_name = %name, "Replaced existing handler");
        } else {
            info!(
                handler_name = %name,
                total_handlers = self.handlers.len(),
                "Handler registered"
            );
        }
    }

    pub fn register_middleware(&mut self, name: &str, middleware: Arc<dyn Middleware>) {
        if self.middleware.insert(name.to_string(), middleware).is_some() {
            warn!(middleware_name = %name, "Replaced existing middleware");
        }
    }

    #[must_use]
    pub fn handler(&self, name: &str) -> Option<Arc<dyn Handler>> {
        self.handlers.get(name).cloned()
    }

    #[must_use]
    pub fn middleware(&self, name: &str) -> Option<Arc<dyn Middleware>> {
        self.middleware.get(name).cloned()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut handlers: Vec<&String> = self.handlers.keys().collect();
        handlers.sort();
        let mut middleware: Vec<&String> = self.middleware.keys().collect();
        middleware.sort();
        f.debug_struct("HandlerRegistry")
            .field("handlers", &handlers)
            .field("middleware", &middleware)
            .finish()
    }
}
