use serde_json::{Map, Value};

use super::RouteBlock;

/// Deep override merge of two JSON maps.
///
/// Keys present in only one side are kept. When both sides hold an object under the
/// same key the objects are merged recursively; any other conflict is won by `overlay`.
#[must_use]
pub fn deep_merge(base: &Map<String, Value>, overlay: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = base.clone();
    for (key, value) in overlay {
        let combined = match (merged.get(key), value) {
            (Some(Value::Object(left)), Value::Object(right)) => Value::Object(deep_merge(left, right)),
            _ => value.clone(),
        };
        merged.insert(key.clone(), combined);
    }
    merged
}

/// Default merge of a shared block with one verb's block.
///
/// The verb's handler replaces the shared one when set, middleware runs shared-first,
/// and config maps are combined with [`deep_merge`].
#[must_use]
pub fn merge_blocks(shared: &RouteBlock, method: &RouteBlock) -> RouteBlock {
    let handler = method.handler.as_ref().or(shared.handler.as_ref()).cloned();
    let middleware = shared
        .middleware
        .iter()
        .chain(method.middleware.iter())
        .cloned()
        .collect();
    RouteBlock {
        handler,
        middleware,
        config: deep_merge(&shared.config, &method.config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::decline;
    use serde_json::json;
    use std::sync::Arc;

    fn map(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_nested_objects_merge_and_scalars_override() {
        let base = map(json!({
            "owner": "inventory",
            "cache": { "ttl": 30, "scope": "public" },
            "tags": ["a"]
        }));
        let overlay = map(json!({
            "cache": { "ttl": 5 },
            "tags": ["b"],
            "summary": "list"
        }));
        let merged = deep_merge(&base, &overlay);
        assert_eq!(
            Value::Object(merged),
            json!({
                "owner": "inventory",
                "cache": { "ttl": 5, "scope": "public" },
                "tags": ["b"],
                "summary": "list"
            })
        );
    }

    #[test]
    fn test_object_replaced_by_scalar() {
        let merged = deep_merge(&map(json!({"a": {"b": 1}})), &map(json!({"a": false})));
        assert_eq!(merged["a"], json!(false));
    }

    #[test]
    fn test_block_handler_falls_back_to_shared() {
        let shared_handler: Arc<dyn crate::handler::Handler> = Arc::new(decline());
        let shared = RouteBlock::new().with_shared_handler(Arc::clone(&shared_handler));
        let merged = merge_blocks(&shared, &RouteBlock::new().with_config("x", json!(1)));
        let got = merged.handler.as_ref().unwrap();
        assert!(Arc::ptr_eq(got, &shared_handler));
        assert_eq!(merged.config["x"], json!(1));
    }
}
