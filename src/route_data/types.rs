use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::handler::Handler;
use crate::middleware::Middleware;

/// Slot key of a method table: the nine standard verbs plus the `Any` wildcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MethodKey {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Connect,
    Options,
    Trace,
    Patch,
    Any,
}

impl MethodKey {
    /// The nine concrete verbs, in slot order.
    pub const VERBS: [MethodKey; 9] = [
        MethodKey::Get,
        MethodKey::Head,
        MethodKey::Post,
        MethodKey::Put,
        MethodKey::Delete,
        MethodKey::Connect,
        MethodKey::Options,
        MethodKey::Trace,
        MethodKey::Patch,
    ];

    /// Every slot, wildcard last.
    pub const ALL: [MethodKey; 10] = [
        MethodKey::Get,
        MethodKey::Head,
        MethodKey::Post,
        MethodKey::Put,
        MethodKey::Delete,
        MethodKey::Connect,
        MethodKey::Options,
        MethodKey::Trace,
        MethodKey::Patch,
        MethodKey::Any,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MethodKey::Get => "get",
            MethodKey::Head => "head",
            MethodKey::Post => "post",
            MethodKey::Put => "put",
            MethodKey::Delete => "delete",
            MethodKey::Connect => "connect",
            MethodKey::Options => "options",
            MethodKey::Trace => "trace",
            MethodKey::Patch => "patch",
            MethodKey::Any => "any",
        }
    }

    /// Parse a route-data key. Case-insensitive; `any` is accepted.
    #[must_use]
    pub fn parse(key: &str) -> Option<Self> {
        MethodKey::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(key))
    }

    /// Slot for a request method. Non-standard methods have no slot of their own.
    #[must_use]
    pub fn from_http(method: &http::Method) -> Option<Self> {
        let key = match method.as_str() {
            "GET" => MethodKey::Get,
            "HEAD" => MethodKey::Head,
            "POST" => MethodKey::Post,
            "PUT" => MethodKey::Put,
            "DELETE" => MethodKey::Delete,
            "CONNECT" => MethodKey::Connect,
            "OPTIONS" => MethodKey::Options,
            "TRACE" => MethodKey::Trace,
            "PATCH" => MethodKey::Patch,
            _ => return None,
        };
        Some(key)
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for MethodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_ascii_uppercase())
    }
}

/// One block of route configuration: the shared part of a route, or one verb's part.
#[derive(Clone, Default)]
pub struct RouteBlock {
    pub handler: Option<Arc<dyn Handler>>,
    pub middleware: Vec<Arc<dyn Middleware>>,
    /// Everything else, merged deeply between shared and verb blocks.
    pub config: Map<String, Value>,
}

impl RouteBlock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_handler(mut self, handler: impl Handler + 'static) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }

    #[must_use]
    pub fn with_shared_handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handler = Some(handler);
        self
    }

    #[must_use]
    pub fn with_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middleware.push(middleware);
        self
    }

    #[must_use]
    pub fn with_config(mut self, key: &str, value: Value) -> Self {
        self.config.insert(key.to_string(), value);
        self
    }

    #[inline]
    #[must_use]
    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }
}

impl fmt::Debug for RouteBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteBlock")
            .field("handler", &self.handler.is_some())
            .field("middleware", &self.middleware.len())
            .field("config", &self.config)
            .finish()
    }
}

/// Route configuration for one path template, split into shared and per-verb blocks.
#[derive(Debug, Clone, Default)]
pub struct RouteData {
    pub shared: RouteBlock,
    pub methods: BTreeMap<MethodKey, RouteBlock>,
}

impl RouteData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Route data with only a shared block.
    #[must_use]
    pub fn shared(block: RouteBlock) -> Self {
        Self {
            shared: block,
            methods: BTreeMap::new(),
        }
    }

    /// A single handler for every method.
    #[must_use]
    pub fn handler(handler: impl Handler + 'static) -> Self {
        Self::shared(RouteBlock::new().with_handler(handler))
    }

    /// Set (or replace) the block for one verb.
    #[must_use]
    pub fn method(mut self, key: MethodKey, block: RouteBlock) -> Self {
        self.methods.insert(key, block);
        self
    }

    #[inline]
    #[must_use]
    pub fn has_methods(&self) -> bool {
        !self.methods.is_empty()
    }
}
