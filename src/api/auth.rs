//! Bearer token handling for the APTO API.
//!
//! The token handed out by the login endpoint is the only credential the
//! client keeps. It is wrapped so it never shows up in `Debug` output or logs.

use std::fmt;

/// An opaque session token issued by the login endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken {
    token: String,
}

impl BearerToken {
    /// Wrap a raw token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// The value for the `Authorization` header.
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// The raw token.
    pub fn as_str(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerToken")
            .field("token", &"<redacted>")
            .finish()
    }
}
