//! Middleware wraps an endpoint's handler. `before` hooks run in order and the first one
//! that returns a response short-circuits the handler; `after` hooks then run in reverse
//! for every middleware that was entered.

mod auth;
mod core;
mod metrics;
mod tracing;

pub use self::auth::AuthMiddleware;
pub use self::core::{layer, Layered, Middleware};
pub use self::metrics::MetricsMiddleware;
pub use self::tracing::TracingMiddleware;
