use http::Method;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::HeaderVec;
use crate::endpoint::Endpoint;
use crate::ids::RequestId;
use crate::route_data::MethodKey;
use crate::router::{Match, ParamVec, PathMatcher};

/// Back-reference from an augmented request to the match that produced it and the
/// router that was asked.
#[derive(Clone)]
pub struct RouteContext {
    pub route_match: Match,
    pub router: Arc<dyn PathMatcher>,
}

impl fmt::Debug for RouteContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteContext")
            .field("template", &self.route_match.template)
            .field("path_params", &self.route_match.path_params)
            .finish_non_exhaustive()
    }
}

/// Request passed to handlers.
///
/// A request fresh off the transport carries `uri` and an optional `method`. The
/// dispatcher hands handlers an augmented copy (see [`HandlerRequest::with_route`])
/// that also carries the extracted path parameters and a [`RouteContext`].
#[derive(Debug, Clone)]
pub struct HandlerRequest {
    /// Unique request ID for tracing and correlation
    pub request_id: RequestId,
    /// HTTP method; `None` resolves against the wildcard slot
    pub method: Option<Method>,
    /// Raw request target, query string included
    pub uri: String,
    /// Query string parameters parsed from `uri`
    pub query_params: ParamVec,
    /// HTTP headers (stack-allocated for ≤16 headers)
    pub headers: HeaderVec,
    /// Request body parsed as JSON (if present)
    pub body: Option<Value>,
    /// Path parameters, filled in by the dispatcher
    pub path_params: ParamVec,
    route: Option<Arc<RouteContext>>,
}

impl HandlerRequest {
    #[must_use]
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        Self::build(Some(method), uri.into())
    }

    /// A request that carries no method at all.
    #[must_use]
    pub fn without_method(uri: impl Into<String>) -> Self {
        Self::build(None, uri.into())
    }

    fn build(method: Option<Method>, uri: String) -> Self {
        let query_params = parse_query_params(&uri);
        Self {
            request_id: RequestId::new(),
            method,
            uri,
            query_params,
            headers: HeaderVec::new(),
            body: None,
            path_params: ParamVec::new(),
            route: None,
        }
    }

    /// Append a header. A [`REQUEST_ID_HEADER`](crate::ids::REQUEST_ID_HEADER) holding a valid id also replaces
    /// [`Self::request_id`]; an invalid one leaves the current id in place.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        if let Some(id) = RequestId::from_header(name, &value) {
            self.request_id = id;
        }
        self.headers.push((Arc::from(name), value));
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Produce the augmented request for a match. The receiver is consumed; callers
    /// that need the raw request keep their own clone.
    #[must_use]
    pub fn with_route(mut self, route_match: Match, router: Arc<dyn PathMatcher>) -> Self {
        self.path_params = route_match.path_params.clone();
        self.route = Some(Arc::new(RouteContext {
            route_match,
            router,
        }));
        self
    }

    /// Request path without query string or fragment.
    #[must_use]
    pub fn path(&self) -> &str {
        strip_query(&self.uri)
    }

    /// Slot key for this request's method; absent or non-standard methods map to `Any`.
    #[must_use]
    pub fn method_key(&self) -> MethodKey {
        self.method
            .as_ref()
            .and_then(MethodKey::from_http)
            .unwrap_or(MethodKey::Any)
    }

    #[must_use]
    pub fn route(&self) -> Option<&RouteContext> {
        self.route.as_deref()
    }

    #[must_use]
    pub fn route_match(&self) -> Option<&Match> {
        self.route().map(|ctx| &ctx.route_match)
    }

    #[must_use]
    pub fn router(&self) -> Option<&Arc<dyn PathMatcher>> {
        self.route().map(|ctx| &ctx.router)
    }

    /// The endpoint this request resolves to in its match, if any.
    #[must_use]
    pub fn endpoint(&self) -> Option<&Arc<Endpoint>> {
        self.route_match()
            .and_then(|m| m.methods.resolve(self.method_key()))
    }

    /// Get a path parameter by name ("last write wins" on duplicates)
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a query parameter by name ("last write wins" on duplicates)
    #[inline]
    #[must_use]
    pub fn get_query_param(&self, name: &str) -> Option<&str> {
        self.query_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a header by name (case-insensitive per RFC 7230)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Note: This allocates - use get_path_param() on the dispatch path
    #[must_use]
    pub fn path_params_map(&self) -> HashMap<String, String> {
        self.path_params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

pub(crate) fn strip_query(uri: &str) -> &str {
    match uri.find(['?', '#']) {
        Some(pos) => &uri[..pos],
        None => uri,
    }
}

/// Parse the query string of a request target into name/value pairs.
pub(crate) fn parse_query_params(uri: &str) -> ParamVec {
    let Some(pos) = uri.find('?') else {
        return ParamVec::new();
    };
    let query = &uri[pos + 1..];
    let query = query.split('#').next().unwrap_or_default();
    url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (Arc::from(k.as_ref()), v.into_owned()))
        .collect()
}
