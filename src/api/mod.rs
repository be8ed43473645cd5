//! APTO API client and types.
//!
//! This module provides the interface for communicating with the APTO REST API.

mod auth;
mod client;
pub mod error;
mod http;
#[cfg(test)]
pub mod mock;
mod transport;
pub mod types;

pub use auth::BearerToken;
pub use client::ApiClient;
pub use error::ApiError;
pub use http::{HttpTransport, DEFAULT_TIMEOUT_SECS};
pub use transport::{ApiRequest, ApiResponse, Method, Transport};
