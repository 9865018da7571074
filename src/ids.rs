//! Request ids for log correlation.
//!
//! Every [`HandlerRequest`](crate::dispatcher::HandlerRequest) carries a [`RequestId`].
//! It is minted when the request is built and replaced when the caller attaches a valid
//! [`REQUEST_ID_HEADER`], so the dispatcher's `request_id` log fields line up with the
//! upstream system that issued the id.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Header whose value, when it parses as a ULID, becomes the request's id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// ULID-backed id; sorts by creation time in logs.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct RequestId(pub ulid::Ulid);

impl RequestId {
    #[must_use]
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }

    /// The id carried by a header, if `name` is [`REQUEST_ID_HEADER`] and `value` parses.
    #[must_use]
    pub fn from_header(name: &str, value: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case(REQUEST_ID_HEADER) {
            value.trim().parse().ok()
        } else {
            None
        }
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl FromStr for RequestId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ulid::Ulid::from_string(s).map(RequestId)
    }
}
