//! Middleware and runtime pieces exercised through a dispatcher.

mod common;

use std::sync::Arc;

use common::{get, status, status_of};
use http::Method;
use route_dispatch::config::DispatchConfig;
use route_dispatch::defaults::DefaultResponses;
use route_dispatch::dispatcher::{Dispatcher, HandlerRequest, HandlerResponse};
use route_dispatch::handler::{block_on, decline, CoroutineHandler, HandlerResult, Outcome};
use route_dispatch::middleware::{Middleware, MetricsMiddleware, TracingMiddleware};
use route_dispatch::route_data::{MethodKey, RouteBlock, RouteData};
use route_dispatch::router::{PathMatcher, Router, SharedRouter};

#[test]
fn test_metrics_count_every_entered_endpoint() {
    let metrics = Arc::new(MetricsMiddleware::new());
    let shared = RouteBlock::new()
        .with_middleware(Arc::clone(&metrics) as Arc<dyn Middleware>)
        .with_middleware(Arc::new(TracingMiddleware));
    let data = RouteData::shared(shared)
        .method(MethodKey::Get, RouteBlock::new().with_shared_handler(status(200)))
        .method(MethodKey::Post, RouteBlock::new().with_shared_handler(status(422)))
        .method(MethodKey::Put, RouteBlock::new().with_handler(decline()));
    let d = Dispatcher::new(Arc::new(Router::new(vec![("/m".to_string(), data)])))
        .with_default_handler(Arc::new(DefaultResponses::new()));

    assert_eq!(status_of(&d.dispatch(get("/m"))), Some(200));
    assert_eq!(
        status_of(&block_on(&d, HandlerRequest::new(Method::POST, "/m"))),
        Some(422)
    );
    // declined inside the middleware stack: entered, but no response observed there
    assert_eq!(
        status_of(&d.dispatch(HandlerRequest::new(Method::PUT, "/m"))),
        Some(406)
    );
    // no handler for DELETE: the endpoint stack is never entered
    assert_eq!(
        status_of(&d.dispatch(HandlerRequest::new(Method::DELETE, "/m"))),
        Some(405)
    );

    assert_eq!(metrics.request_count(), 3);
    assert_eq!(metrics.response_count(), 2);
    assert_eq!(metrics.error_responses(), 1);
}

#[test]
fn test_coroutine_handler_behind_dispatcher() {
    let config = DispatchConfig::default();
    // SAFETY: test-only coroutine spawn; the handler function does not block.
    let handler = unsafe {
        CoroutineHandler::spawn("greet", config.stack_size, |req: HandlerRequest| -> HandlerResult {
            let name = req.get_path_param("name").unwrap_or("nobody").to_string();
            Ok(Outcome::Respond(HandlerResponse::json(
                200,
                serde_json::json!({ "greeting": format!("hello {name}") }),
            )))
        })
    }
    .unwrap();
    assert_eq!(handler.name(), "greet");

    let d = Dispatcher::new(Arc::new(Router::new(vec![(
        "/greet/{name}".to_string(),
        RouteData::handler(handler),
    )])));

    let resp = block_on(&d, get("/greet/ada")).unwrap().into_response().unwrap();
    assert_eq!(resp.body["greeting"], "hello ada");
    let resp = d.dispatch(get("/greet/bob")).unwrap().into_response().unwrap();
    assert_eq!(resp.body["greeting"], "hello bob");
}

#[test]
fn test_shared_router_swap_is_seen_by_dispatcher() {
    let shared = Arc::new(SharedRouter::new(Router::new(vec![(
        "/v".to_string(),
        RouteData::shared(RouteBlock::new().with_shared_handler(status(200))),
    )])));
    let d = Dispatcher::new(Arc::clone(&shared) as Arc<dyn PathMatcher>)
        .with_default_handler(Arc::new(DefaultResponses::new()));

    assert_eq!(status_of(&d.dispatch(get("/v"))), Some(200));
    assert_eq!(status_of(&d.dispatch(get("/w"))), Some(404));

    shared.swap(Router::new(vec![(
        "/w".to_string(),
        RouteData::shared(RouteBlock::new().with_shared_handler(status(202))),
    )]));

    assert_eq!(status_of(&d.dispatch(get("/v"))), Some(404));
    assert_eq!(status_of(&d.dispatch(get("/w"))), Some(202));
}
