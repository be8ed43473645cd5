//! The request/response seam between the typed client and the wire.
//!
//! `ApiClient` builds `ApiRequest`s and interprets `ApiResponse`s; a
//! `Transport` only moves them. The production transport is
//! [`HttpTransport`](super::HttpTransport); tests script a mock instead.

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use super::auth::BearerToken;
use super::error::Result;

/// HTTP verbs used by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// A request relative to the API base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path starting with `/api/`.
    pub path: String,
    pub body: Option<Value>,
    pub token: Option<BearerToken>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            token: None,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_token(mut self, token: &BearerToken) -> Self {
        self.token = Some(token.clone());
        self
    }
}

/// Status and decoded body of a response.
///
/// Bodies that are empty or not JSON decode to `Value::Null`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The `erro` field the API puts on failures.
    pub fn error_message(&self) -> Option<String> {
        self.body
            .get("erro")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

/// Moves requests to the API and brings back responses.
///
/// Implementations report a non-2xx status as a normal `ApiResponse`;
/// only failures to get any response at all are errors.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;
}
