use super::Middleware;
use crate::dispatcher::{HandlerRequest, HandlerResponse};

/// Static bearer-token gate: requests whose `authorization` header does not equal the
/// configured token are answered with `401` before the handler runs.
pub struct AuthMiddleware {
    token: String,
}

impl AuthMiddleware {
    #[must_use]
    pub fn new(token: String) -> Self {
        Self { token }
    }
}

impl Middleware for AuthMiddleware {
    fn before(&self, req: &HandlerRequest) -> Option<HandlerResponse> {
        match req.get_header("authorization") {
            Some(h) if h == self.token => None,
            _ => Some(HandlerResponse::error(401, "Unauthorized")),
        }
    }
}
