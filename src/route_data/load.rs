use anyhow::Context;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

use super::{MethodKey, RouteBlock, RouteData};
use crate::registry::HandlerRegistry;

const HANDLER_KEY: &str = "handler";
const MIDDLEWARE_KEY: &str = "middleware";

/// Route file content that cannot be turned into [`RouteData`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDataError {
    /// The document has no top-level `routes` mapping
    MissingRoutes,
    /// A route entry or verb block is not a mapping
    NotAMapping {
        /// Path template of the entry
        path: String,
        /// Verb block, if the problem is inside one
        method: Option<MethodKey>,
    },
    /// `handler` is not a string
    InvalidHandler { path: String },
    /// `middleware` is not a list of strings
    InvalidMiddleware { path: String },
    /// No handler is registered under this name
    UnknownHandler { path: String, name: String },
    /// No middleware is registered under this name
    UnknownMiddleware { path: String, name: String },
    /// A verb key appears inside another verb's block
    NestedMethod {
        path: String,
        method: MethodKey,
        nested: String,
    },
}

impl fmt::Display for RouteDataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteDataError::MissingRoutes => write!(f, "route file has no 'routes' mapping"),
            RouteDataError::NotAMapping { path, method: None } => {
                write!(f, "route '{path}': entry must be a mapping")
            }
            RouteDataError::NotAMapping {
                path,
                method: Some(method),
            } => write!(f, "route '{path}': {method} block must be a mapping"),
            RouteDataError::InvalidHandler { path } => {
                write!(f, "route '{path}': 'handler' must be a handler name")
            }
            RouteDataError::InvalidMiddleware { path } => {
                write!(f, "route '{path}': 'middleware' must be a list of names")
            }
            RouteDataError::UnknownHandler { path, name } => {
                write!(f, "route '{path}': no handler registered as '{name}'")
            }
            RouteDataError::UnknownMiddleware { path, name } => {
                write!(f, "route '{path}': no middleware registered as '{name}'")
            }
            RouteDataError::NestedMethod {
                path,
                method,
                nested,
            } => write!(
                f,
                "route '{path}': {method} block may not contain method key '{nested}'"
            ),
        }
    }
}

impl std::error::Error for RouteDataError {}

/// Read a YAML (`.yaml`/`.yml`) or JSON route file into a JSON document.
pub fn read_route_document(file_path: impl AsRef<Path>) -> anyhow::Result<Value> {
    let file_path = file_path.as_ref();
    let content = std::fs::read_to_string(file_path)
        .with_context(|| format!("failed to read route file {}", file_path.display()))?;
    let is_yaml = matches!(
        file_path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    );
    let value = if is_yaml {
        serde_yaml::from_str(&content)
            .with_context(|| format!("invalid YAML in {}", file_path.display()))?
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("invalid JSON in {}", file_path.display()))?
    };
    Ok(value)
}

/// Load route data from a YAML (`.yaml`/`.yml`) or JSON file.
pub fn load_routes(
    file_path: impl AsRef<Path>,
    registry: &HandlerRegistry,
) -> anyhow::Result<Vec<(String, RouteData)>> {
    let file_path = file_path.as_ref();
    let value = read_route_document(file_path)?;
    let routes = parse_routes(&value, registry)
        .with_context(|| format!("invalid route data in {}", file_path.display()))?;
    info!(
        file = %file_path.display(),
        routes_count = routes.len(),
        "Route file loaded"
    );
    Ok(routes)
}

/// Handler and middleware names a route document refers to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferencedNames {
    pub handlers: BTreeSet<String>,
    pub middleware: BTreeSet<String>,
}

/// Collect every `handler` and `middleware` name in a route document, shared and
/// per-verb blocks alike. Malformed values are skipped; [`parse_routes`] reports them.
#[must_use]
pub fn referenced_names(document: &Value) -> ReferencedNames {
    fn visit(block: &Map<String, Value>, names: &mut ReferencedNames) {
        if let Some(name) = block.get(HANDLER_KEY).and_then(Value::as_str) {
            names.handlers.insert(name.to_string());
        }
        if let Some(list) = block.get(MIDDLEWARE_KEY).and_then(Value::as_array) {
            names
                .middleware
                .extend(list.iter().filter_map(Value::as_str).map(str::to_string));
        }
    }

    let mut names = ReferencedNames::default();
    let entries = document
        .get("routes")
        .and_then(Value::as_object)
        .into_iter()
        .flat_map(|routes| routes.values())
        .filter_map(Value::as_object);
    for entry in entries {
        visit(entry, &mut names);
        for (key, value) in entry {
            if let (Some(_), Some(block)) = (MethodKey::parse(key), value.as_object()) {
                visit(block, &mut names);
            }
        }
    }
    names
}

/// Tag a parsed `{ routes: { <template>: <entry> } }` document into [`RouteData`].
pub fn parse_routes(
    document: &Value,
    registry: &HandlerRegistry,
) -> Result<Vec<(String, RouteData)>, RouteDataError> {
    let routes = document
        .get("routes")
        .and_then(Value::as_object)
        .ok_or(RouteDataError::MissingRoutes)?;

    routes
        .iter()
        .map(|(path, entry)| Ok((path.clone(), parse_entry(path, entry, registry)?)))
        .collect()
}

fn parse_entry(
    path: &str,
    entry: &Value,
    registry: &HandlerRegistry,
) -> Result<RouteData, RouteDataError> {
    let entry = match entry {
        Value::Null => return Ok(RouteData::new()),
        Value::Object(map) => map,
        _ => {
            return Err(RouteDataError::NotAMapping {
                path: path.to_string(),
                method: None,
            })
        }
    };

    let mut shared = Map::new();
    let mut data = RouteData::new();
    for (key, value) in entry {
        match MethodKey::parse(key) {
            Some(method) => {
                let block = match value {
                    Value::Null => RouteBlock::new(),
                    Value::Object(map) => parse_block(path, Some(method), map, registry)?,
                    _ => {
                        return Err(RouteDataError::NotAMapping {
                            path: path.to_string(),
                            method: Some(method),
                        })
                    }
                };
                data.methods.insert(method, block);
            }
            None => {
                shared.insert(key.clone(), value.clone());
            }
        }
    }
    data.shared = parse_block(path, None, &shared, registry)?;

    debug!(
        path = %path,
        shared_handler = data.shared.has_handler(),
        methods = ?data.methods.keys().collect::<Vec<_>>(),
        "Route entry parsed"
    );
    Ok(data)
}

fn parse_block(
    path: &str,
    method: Option<MethodKey>,
    map: &Map<String, Value>,
    registry: &HandlerRegistry,
) -> Result<RouteBlock, RouteDataError> {
    let mut block = RouteBlock::new();
    for (key, value) in map {
        if let (Some(method), Some(_)) = (method, MethodKey::parse(key)) {
            return Err(RouteDataError::NestedMethod {
                path: path.to_string(),
                method,
                nested: key.clone(),
            });
        }
        match key.as_str() {
            HANDLER_KEY => {
                let name = value.as_str().ok_or_else(|| RouteDataError::InvalidHandler {
                    path: path.to_string(),
                })?;
                let handler =
                    registry
                        .handler(name)
                        .ok_or_else(|| RouteDataError::UnknownHandler {
                            path: path.to_string(),
                            name: name.to_string(),
                        })?;
                block.handler = Some(handler);
            }
            MIDDLEWARE_KEY => {
                let names = value.as_array().ok_or_else(|| RouteDataError::InvalidMiddleware {
                    path: path.to_string(),
                })?;
                for name in names {
                    let name = name.as_str().ok_or_else(|| RouteDataError::InvalidMiddleware {
                        path: path.to_string(),
                    })?;
                    let mw = registry.middleware(name).ok_or_else(|| {
                        RouteDataError::UnknownMiddleware {
                            path: path.to_string(),
                            name: name.to_string(),
                        }
                    })?;
                    block.middleware.push(mw);
                }
            }
            _ => {
                block.config.insert(key.clone(), value.clone());
            }
        }
    }
    Ok(block)
}
