use serde_json::{json, Map, Value};

use crate::dispatcher::{HandlerRequest, HandlerResponse};
use crate::handler::{respond, Handler};

fn params_object<'a>(params: impl Iterator<Item = &'a (std::sync::Arc<str>, String)>) -> Value {
    let map: Map<String, Value> = params
        .map(|(k, v)| (k.to_string(), Value::String(v.clone())))
        .collect();
    Value::Object(map)
}

/// Echo the request back as JSON, tagged with `name`.
pub fn echo_body(name: &str, req: &HandlerRequest) -> Value {
    json!({
        "handler": name,
        "method": req.method.as_ref().map(ToString::to_string),
        "uri": req.uri,
        "path": req.path(),
        "template": req.route_match().map(|m| m.template.to_string()),
        "params": params_object(req.path_params.iter()),
        "query": params_object(req.query_params.iter()),
        "body": req.body,
    })
}

/// Handler answering every request with `200` and [`echo_body`].
pub fn echo_handler(name: &str) -> impl Handler {
    let name = name.to_string();
    respond(move |req| HandlerResponse::json(200, echo_body(&name, &req)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::Outcome;
    use http::Method;

    #[test]
    fn test_echo_reports_request() {
        let handler = echo_handler("list_items");
        let req = HandlerRequest::new(Method::GET, "/items?limit=5")
            .with_body(json!({ "x": 1 }));
        let Ok(Outcome::Respond(resp)) = handler.call(req) else {
            panic!("echo must respond");
        };
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body["handler"], "list_items");
        assert_eq!(resp.body["method"], "GET");
        assert_eq!(resp.body["path"], "/items");
        assert_eq!(resp.body["query"]["limit"], "5");
        assert_eq!(resp.body["body"]["x"], 1);
        assert!(resp.body["template"].is_null());
    }
}
