use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use super::HeaderVec;

/// Concrete response produced by a handler.
///
/// The "no response" case is never encoded here: a declining handler returns
/// [`Outcome::Declined`](crate::handler::Outcome::Declined) instead, so an empty
/// `HandlerResponse` is always a real answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandlerResponse {
    /// HTTP status code (200, 404, 500, etc.)
    pub status: u16,
    /// Response headers (stack-allocated for ≤16 headers)
    #[serde(skip_serializing)]
    pub headers: HeaderVec,
    /// Response body as JSON; `Value::Null` means an empty body
    pub body: Value,
}

impl HandlerResponse {
    #[must_use]
    pub fn new(status: u16, headers: HeaderVec, body: Value) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Status line only: no headers, empty body.
    #[must_use]
    pub fn status_only(status: u16) -> Self {
        Self::new(status, HeaderVec::new(), Value::Null)
    }

    /// JSON response with a `content-type` header.
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), "application/json".to_string()));
        Self {
            status,
            headers,
            body,
        }
    }

    /// JSON error body of the form `{"error": message}`.
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, serde_json::json!({ "error": message }))
    }

    #[inline]
    #[must_use]
    pub fn has_body(&self) -> bool {
        !self.body.is_null()
    }

    /// Get a header by name (case-insensitive)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or replace a header
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_only_has_no_body() {
        let resp = HandlerResponse::status_only(405);
        assert_eq!(resp.status, 405);
        assert!(!resp.has_body());
        assert!(resp.headers.is_empty());
    }

    #[test]
    fn test_set_header_replaces_case_insensitively() {
        let mut resp = HandlerResponse::json(200, json!({"ok": true}));
        resp.set_header("Content-Type", "text/plain".to_string());
        assert_eq!(resp.headers.len(), 1);
        assert_eq!(resp.get_header("content-type"), Some("text/plain"));
    }
}
