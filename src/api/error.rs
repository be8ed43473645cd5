//! API error types for the APTO client.

use thiserror::Error;

/// Errors that can occur when talking to the APTO API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Credentials were rejected or the session token is no longer valid.
    #[error("Authentication failed: {}", .message.as_deref().unwrap_or("invalid credentials"))]
    Unauthorized { message: Option<String> },

    /// The authenticated user may not access this resource.
    #[error("Permission denied: {}", .message.as_deref().unwrap_or("access denied"))]
    Forbidden { message: Option<String> },

    /// Resource not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Any other 4xx response.
    #[error("Request rejected (HTTP {status}): {}", .message.as_deref().unwrap_or("no details"))]
    Rejected { status: u16, message: Option<String> },

    /// 5xx response.
    #[error("Server error (HTTP {status}): {}", .message.as_deref().unwrap_or("no details"))]
    ServerError { status: u16, message: Option<String> },

    /// Network or HTTP error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The transport failed before a response was received.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Invalid base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid response from the API.
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// Create an error from an HTTP status code and the server's `erro` message.
    pub fn from_status(status: u16, context: &str, message: Option<String>) -> Self {
        match status {
            401 => ApiError::Unauthorized { message },
            403 => ApiError::Forbidden { message },
            404 => ApiError::NotFound(message.unwrap_or_else(|| context.to_string())),
            500..=599 => ApiError::ServerError { status, message },
            _ => ApiError::Rejected { status, message },
        }
    }

    /// The message the server attached to the failure, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized { message }
            | ApiError::Forbidden { message }
            | ApiError::Rejected { message, .. }
            | ApiError::ServerError { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Whether the request never produced an HTTP response.
    pub fn is_connection_failure(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::ConnectionFailed(_))
    }

    /// Whether the server answered 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }
}
