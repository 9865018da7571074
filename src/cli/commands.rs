use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use http::Method;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::DispatchConfig;
use crate::defaults::DefaultResponses;
use crate::dispatcher::{Dispatcher, HandlerRequest};
use crate::echo::echo_body;
use crate::handler::{block_on, CoroutineHandler, HandlerResult, Outcome};
use crate::middleware::{MetricsMiddleware, Middleware, TracingMiddleware};
use crate::registry::HandlerRegistry;
use crate::route_data::{parse_routes, read_route_document, referenced_names};
use crate::router::Router;

/// Command-line interface for route-dispatch
#[derive(Parser)]
#[command(name = "route-dispatch")]
#[command(about = "Inspect and exercise route files", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List every route template with the methods that reach a handler
    Inspect {
        /// Route file (YAML or JSON)
        #[arg(short, long)]
        routes: PathBuf,
    },
    /// Dispatch one request against echo handlers and print the response
    Resolve {
        /// Route file (YAML or JSON)
        #[arg(short, long)]
        routes: PathBuf,

        /// Request target, query string allowed
        #[arg(short, long)]
        uri: String,

        /// HTTP method; omitted means the request carries no method
        #[arg(short, long)]
        method: Option<String>,
    },
}

/// Parse arguments from the process and run the selected command.
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let stdout = std::io::stdout();
    execute(&cli.command, &mut stdout.lock())
}

/// Run `command`, writing its report to `out`.
pub fn execute(command: &Commands, out: &mut dyn Write) -> anyhow::Result<()> {
    match command {
        Commands::Inspect { routes } => inspect(routes, out),
        Commands::Resolve {
            routes,
            uri,
            method,
        } => resolve(routes, uri, method.as_deref(), out),
    }
}

/// Middleware name the CLI binds to a [`MetricsMiddleware`] instead of tracing.
pub const METRICS_MIDDLEWARE: &str = "metrics";

/// A route file loaded against echo handlers.
pub struct EchoRoutes {
    pub router: Router,
    /// Present when the file references [`METRICS_MIDDLEWARE`]
    pub metrics: Option<Arc<MetricsMiddleware>>,
}

/// Load a route file with an echo handler registered under every handler name it uses.
///
/// Echo handlers run on `may` coroutines sized by [`DispatchConfig`]. The middleware name
/// [`METRICS_MIDDLEWARE`] is bound to one shared [`MetricsMiddleware`]; every other
/// middleware name is bound to [`TracingMiddleware`].
pub fn load_with_echo_handlers(path: &Path) -> anyhow::Result<EchoRoutes> {
    let document = read_route_document(path)?;
    let names = referenced_names(&document);
    let config = DispatchConfig::from_env();

    let mut registry = HandlerRegistry::new();
    for name in &names.handlers {
        let handler_name = name.clone();
        // SAFETY: may::coroutine spawning is marked unsafe by the may runtime. The echo
        // function only reads its request.
        let handler = unsafe {
            CoroutineHandler::spawn(name, config.stack_size, move |req: HandlerRequest| -> HandlerResult {
                Ok(Outcome::Respond(crate::dispatcher::HandlerResponse::json(
                    200,
                    echo_body(&handler_name, &req),
                )))
            })?
        };
        registry.register(name, handler);
    }

    let mut metrics = None;
    for name in &names.middleware {
        if name == METRICS_MIDDLEWARE {
            let shared = Arc::new(MetricsMiddleware::new());
            registry.register_middleware(name, Arc::clone(&shared) as Arc<dyn Middleware>);
            metrics = Some(shared);
        } else {
            registry.register_middleware(name, Arc::new(TracingMiddleware));
        }
    }

    let routes = parse_routes(&document, &registry)
        .with_context(|| format!("invalid route data in {}", path.display()))?;
    Ok(EchoRoutes {
        router: Router::new(routes),
        metrics,
    })
}

fn inspect(path: &Path, out: &mut dyn Write) -> anyhow::Result<()> {
    let router = load_with_echo_handlers(path)?.router;
    writeln!(out, "routes: {}", router.len())?;
    for (template, table) in router.routes() {
        let methods: Vec<String> = table
            .allowed_methods()
            .iter()
            .map(ToString::to_string)
            .collect();
        let methods = if methods.is_empty() {
            "-".to_string()
        } else {
            methods.join(",")
        };
        writeln!(out, "{template} {methods}")?;
    }
    Ok(())
}

fn resolve(path: &Path, uri: &str, method: Option<&str>, out: &mut dyn Write) -> anyhow::Result<()> {
    let EchoRoutes { router, metrics } = load_with_echo_handlers(path)?;
    let dispatcher = Dispatcher::new(Arc::new(router))
        .with_default_handler(Arc::new(DefaultResponses::new()));

    let req = match method {
        Some(m) => {
            let method = Method::from_bytes(m.to_ascii_uppercase().as_bytes())
                .map_err(|_| anyhow!("invalid HTTP method '{m}'"))?;
            HandlerRequest::new(method, uri)
        }
        None => HandlerRequest::without_method(uri),
    };

    match block_on(&dispatcher, req).map_err(|e| anyhow!("dispatch failed: {e}"))? {
        Outcome::Respond(resp) => {
            writeln!(out, "status: {}", resp.status)?;
            if resp.has_body() {
                writeln!(out, "{}", serde_json::to_string_pretty(&resp.body)?)?;
            }
        }
        Outcome::Declined => writeln!(out, "declined")?,
    }
    if let Some(metrics) = metrics {
        writeln!(
            out,
            "metrics: requests={} responses={} errors={}",
            metrics.request_count(),
            metrics.response_count(),
            metrics.error_responses()
        )?;
    }
    Ok(())
}
