//! Unit tests for CLI commands

use crate::cli::{execute, Cli, Commands};
use clap::Parser;
use std::io::Write;

const ROUTES: &str = r#"
routes:
  /items:
    owner: inventory
    get:
      handler: list_items
    post:
      handler: create_item
      middleware: [audit]
  /items/{id}:
    handler: get_item
  /docs:
    delete: {}
"#;

fn route_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    file.write_all(ROUTES.as_bytes()).unwrap();
    file
}

fn run(command: &Commands) -> String {
    let mut out = Vec::new();
    execute(command, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn test_resolve_command_parses_optional_method() {
    let cli = Cli::try_parse_from(["route-dispatch", "resolve", "--routes", "r.yaml", "--uri", "/x"])
        .unwrap();
    match cli.command {
        Commands::Resolve { uri, method, .. } => {
            assert_eq!(uri, "/x");
            assert!(method.is_none());
        }
        Commands::Inspect { .. } => panic!("Expected Resolve command"),
    }

    let cli = Cli::try_parse_from(["route-dispatch", "inspect", "-r", "r.yaml"]).unwrap();
    assert!(matches!(cli.command, Commands::Inspect { .. }));
    assert!(Cli::try_parse_from(["route-dispatch", "resolve", "--uri", "/x"]).is_err());
}

#[test]
fn test_inspect_lists_reachable_methods() {
    let file = route_file();
    let output = run(&Commands::Inspect {
        routes: file.path().to_path_buf(),
    });
    assert!(output.contains("routes: 3"), "{output}");
    assert!(output.contains("/items GET,POST"), "{output}");
    assert!(output.contains("/docs -"), "{output}");
    assert!(
        output.contains("/items/{id} GET,HEAD,POST,PUT,DELETE,CONNECT,OPTIONS,TRACE,PATCH"),
        "{output}"
    );
}

#[test]
fn test_resolve_echoes_matched_request() {
    let file = route_file();
    let output = run(&Commands::Resolve {
        routes: file.path().to_path_buf(),
        uri: "/items/42?verbose=1".to_string(),
        method: Some("get".to_string()),
    });
    assert!(output.starts_with("status: 200"), "{output}");
    assert!(output.contains("\"handler\": \"get_item\""), "{output}");
    assert!(output.contains("\"id\": \"42\""), "{output}");
    assert!(output.contains("\"template\": \"/items/{id}\""), "{output}");
}

#[test]
fn test_resolve_reports_default_statuses() {
    let file = route_file();
    let status = |uri: &str, method: Option<&str>| {
        run(&Commands::Resolve {
            routes: file.path().to_path_buf(),
            uri: uri.to_string(),
            method: method.map(str::to_string),
        })
    };
    assert_eq!(status("/missing", Some("GET")).trim(), "status: 404");
    assert_eq!(status("/items", Some("DELETE")).trim(), "status: 405");
    assert_eq!(status("/items", None).trim(), "status: 405");
    assert_eq!(status("/docs", Some("DELETE")).trim(), "status: 405");
}

#[test]
fn test_resolve_rejects_bad_method() {
    let file = route_file();
    let mut out = Vec::new();
    let err = execute(
        &Commands::Resolve {
            routes: file.path().to_path_buf(),
            uri: "/items".to_string(),
            method: Some("NOT A METHOD".to_string()),
        },
        &mut out,
    )
    .unwrap_err();
    assert!(err.to_string().contains("invalid HTTP method"));
}

#[test]
fn test_resolve_reports_metrics_for_metered_routes() {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    file.write_all(
        b"routes:\n  /metered:\n    middleware: [metrics]\n    get: { handler: read }\n    put: {}\n",
    )
    .unwrap();
    let resolve = |method: &str| {
        run(&Commands::Resolve {
            routes: file.path().to_path_buf(),
            uri: "/metered".to_string(),
            method: Some(method.to_string()),
        })
    };

    let output = resolve("GET");
    assert!(output.starts_with("status: 200"), "{output}");
    assert!(output.contains("metrics: requests=1 responses=1 errors=0"), "{output}");

    // PUT has no handler, so the metered stack is never entered
    let output = resolve("PUT");
    assert!(output.starts_with("status: 405"), "{output}");
    assert!(output.contains("metrics: requests=0 responses=0 errors=0"), "{output}");
}
