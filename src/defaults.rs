//! Terminal responses for requests nothing else answered.
//!
//! [`DefaultResponses`] looks at what the dispatcher recorded on the request and picks
//! one of three handlers:
//!
//! | situation                                         | handler              | default |
//! |---------------------------------------------------|----------------------|---------|
//! | no route matched                                  | `not_found`          | 404     |
//! | route matched, no handler for the method or `Any` | `method_not_allowed` | 405     |
//! | route matched, a handler exists but none answered | `not_acceptable`     | 406     |
//!
//! It is normally installed as the dispatcher's default handler.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::dispatcher::{HandlerRequest, HandlerResponse};
use crate::handler::{respond, Continuation, Handler, HandlerResult};
use crate::route_data::MethodKey;

/// Why a request reached the default responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unhandled {
    NoRoute,
    MethodNotAllowed,
    NotAcceptable,
}

/// Classify a request that reached the default handler.
///
/// Requests without route information (the raw request of a miss) are `NoRoute`. A
/// matched request is `MethodNotAllowed` only when neither its method slot nor the `Any`
/// slot holds a handler; otherwise something was there to answer and declined.
#[must_use]
pub fn classify(req: &HandlerRequest) -> Unhandled {
    let Some(route_match) = req.route_match() else {
        return Unhandled::NoRoute;
    };
    let table = &route_match.methods;
    let slot_has_handler = |key| table.get(key).is_some_and(|ep| ep.has_handler());
    if slot_has_handler(req.method_key()) || slot_has_handler(MethodKey::Any) {
        Unhandled::NotAcceptable
    } else {
        Unhandled::MethodNotAllowed
    }
}

/// Overrides for [`DefaultResponses::with_options`]; `None` keeps the default.
#[derive(Clone, Default)]
pub struct DefaultResponseOptions {
    pub not_found: Option<Arc<dyn Handler>>,
    pub method_not_allowed: Option<Arc<dyn Handler>>,
    pub not_acceptable: Option<Arc<dyn Handler>>,
}

/// Stateless classifier routing unhandled requests to one of three terminal handlers.
#[derive(Clone)]
pub struct DefaultResponses {
    not_found: Arc<dyn Handler>,
    method_not_allowed: Arc<dyn Handler>,
    not_acceptable: Arc<dyn Handler>,
}

fn status_handler(status: u16) -> Arc<dyn Handler> {
    Arc::new(respond(move |_req| HandlerResponse::status_only(status)))
}

impl Default for DefaultResponses {
    fn default() -> Self {
        Self::with_options(DefaultResponseOptions::default())
    }
}

impl DefaultResponses {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_options(options: DefaultResponseOptions) -> Self {
        Self {
            not_found: options.not_found.unwrap_or_else(|| status_handler(404)),
            method_not_allowed: options
                .method_not_allowed
                .unwrap_or_else(|| status_handler(405)),
            not_acceptable: options
                .not_acceptable
                .unwrap_or_else(|| status_handler(406)),
        }
    }

    fn select(&self, req: &HandlerRequest) -> &Arc<dyn Handler> {
        let kind = classify(req);
        debug!(
            request_id = %req.request_id,
            path = %req.path(),
            method = ?req.method,
            classification = ?kind,
            "Unhandled request classified"
        );
        match kind {
            Unhandled::NoRoute => &self.not_found,
            Unhandled::MethodNotAllowed => &self.method_not_allowed,
            Unhandled::NotAcceptable => &self.not_acceptable,
        }
    }
}

impl fmt::Debug for DefaultResponses {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultResponses").finish_non_exhaustive()
    }
}

impl Handler for DefaultResponses {
    fn call(&self, req: HandlerRequest) -> HandlerResult {
        self.select(&req).call(req)
    }

    fn call_async(&self, req: HandlerRequest, k: Continuation) {
        let handler = Arc::clone(self.select(&req));
        handler.call_async(req, k);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{decline, Outcome};
    use crate::route_data::{RouteBlock, RouteData};
    use crate::router::{PathMatcher, Router};
    use http::Method;

    fn router() -> Arc<dyn PathMatcher> {
        Arc::new(Router::new(vec![
            (
                "/items".to_string(),
                RouteData::new().method(
                    MethodKey::Get,
                    RouteBlock::new().with_handler(decline()),
                ),
            ),
            ("/any".to_string(), RouteData::handler(decline())),
            (
                "/split".to_string(),
                RouteData::new()
                    .method(
                        MethodKey::Get,
                        RouteBlock::new().with_config("summary", serde_json::json!("no handler")),
                    )
                    .method(MethodKey::Any, RouteBlock::new().with_handler(decline())),
            ),
            (
                "/bare".to_string(),
                RouteData::new().method(MethodKey::Get, RouteBlock::new()),
            ),
        ]))
    }

    fn augmented(method: Method, uri: &str) -> HandlerRequest {
        let router = router();
        let m = router.match_by_path(uri).unwrap();
        HandlerRequest::new(method, uri).with_route(m, router)
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(&HandlerRequest::new(Method::GET, "/nope")), Unhandled::NoRoute);
        assert_eq!(classify(&augmented(Method::GET, "/items")), Unhandled::NotAcceptable);
        assert_eq!(classify(&augmented(Method::DELETE, "/items")), Unhandled::MethodNotAllowed);
        assert_eq!(classify(&augmented(Method::DELETE, "/any")), Unhandled::NotAcceptable);
        assert_eq!(
            classify(&HandlerRequest::without_method("/any").with_route(
                router().match_by_path("/any").unwrap(),
                router(),
            )),
            Unhandled::NotAcceptable
        );
    }

    #[test]
    fn test_handlerless_verb_slot_defers_to_any() {
        // GET holds an endpoint without a handler, `Any` holds a handler
        assert_eq!(classify(&augmented(Method::GET, "/split")), Unhandled::NotAcceptable);
        assert_eq!(classify(&augmented(Method::PUT, "/split")), Unhandled::NotAcceptable);
        // nothing with a handler anywhere
        assert_eq!(classify(&augmented(Method::GET, "/bare")), Unhandled::MethodNotAllowed);
    }

    #[test]
    fn test_default_statuses_have_empty_bodies() {
        let defaults = DefaultResponses::new();
        for (req, expected) in [
            (HandlerRequest::new(Method::GET, "/nope"), 404),
            (augmented(Method::DELETE, "/items"), 405),
            (augmented(Method::GET, "/items"), 406),
        ] {
            let resp = defaults.call(req).unwrap().into_response().unwrap();
            assert_eq!(resp.status, expected);
            assert!(!resp.has_body());
        }
    }

    #[test]
    fn test_overrides_replace_only_their_case() {
        let defaults = DefaultResponses::with_options(DefaultResponseOptions {
            not_found: Some(Arc::new(respond(|_req| {
                HandlerResponse::error(404, "nothing here")
            }))),
            ..DefaultResponseOptions::default()
        });
        let resp = defaults
            .call(HandlerRequest::new(Method::GET, "/nope"))
            .unwrap()
            .into_response()
            .unwrap();
        assert!(resp.has_body());
        assert_eq!(
            defaults.call(augmented(Method::GET, "/items")).unwrap(),
            Outcome::Respond(HandlerResponse::status_only(406))
        );
    }
}
