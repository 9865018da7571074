//! # CLI Module
//!
//! Backs the `route-dispatch` binary, which loads a route file with echo handlers bound
//! to every handler name it mentions. The middleware name `metrics` gets request
//! counters that `resolve` prints after the response.
//!
//! ```bash
//! # templates and the methods that reach a handler
//! route-dispatch inspect --routes routes.yaml
//!
//! # dispatch a single request and print status + echoed JSON
//! route-dispatch resolve --routes routes.yaml --uri '/items/42?verbose=1' --method get
//! ```

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{
    execute, load_with_echo_handlers, run_cli, Cli, Commands, EchoRoutes, METRICS_MIDDLEWARE,
};
