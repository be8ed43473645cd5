//! reqwest-backed transport.
//!
//! Sends JSON requests to the configured APTO instance. Failures are never
//! retried; the user retries manually.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::error::{ApiError, Result};
use super::transport::{ApiRequest, ApiResponse, Method, Transport};

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Transport that talks HTTP to a real server.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    /// The HTTP client.
    client: Client,
    /// The base URL of the API host, without trailing slash.
    base_url: String,
}

impl HttpTransport {
    /// Create a transport for `base_url` with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL has no http(s) scheme or the HTTP client
    /// cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Network)?;

        Ok(Self {
            client,
            base_url: normalize_base_url(base_url),
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let url = format!("{}{}", self.base_url, request.path);

        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Delete => self.client.delete(&url),
        }
        .header(header::ACCEPT, "application/json");

        if let Some(token) = &request.token {
            builder = builder.header(header::AUTHORIZATION, token.header_value());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        debug!(status, bytes = text.len(), "Response received");

        // Error bodies from proxies are often HTML; they carry nothing we can show.
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::Null)
        };

        Ok(ApiResponse::new(status, body))
    }
}

/// Normalize the base URL by removing trailing slashes.
fn normalize_base_url(url: &str) -> String {
    let url = url.trim_end_matches('/');

    // Warn if not HTTPS (but don't enforce for localhost/testing)
    if !url.starts_with("https://") && !url.contains("localhost") && !url.contains("127.0.0.1") {
        warn!("URL does not use HTTPS: {}. Tokens travel in clear text.", url);
    }

    url.to_string()
}
