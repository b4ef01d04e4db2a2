//! Error types for the DHIS2 API client.
//!
//! # Design
//! Each failure mode gets its own variant so callers can branch on the
//! cause rather than on message text: URL composition, HTTP status, JSON
//! parsing and transport failures are distinct. Non-2xx responses land in
//! `HttpStatus` with the raw status code and body for debugging.

use std::fmt;

/// Errors returned by `Dhis2Client`.
#[derive(Debug)]
pub enum ApiError {
    /// The base URL and endpoint do not compose into a parseable URL.
    InvalidUrl(String),

    /// The server answered with a status outside 200-299.
    HttpStatus { status: u16, body: String },

    /// The response body could not be parsed as JSON.
    JsonParse(String),

    /// Transport-level failure: DNS, connection refused, timeout,
    /// truncated body.
    Network(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidUrl(msg) => write!(f, "invalid URL: {msg}"),
            ApiError::HttpStatus { status, body } => {
                write!(f, "HTTP {status}: {body}")
            }
            ApiError::JsonParse(msg) => write!(f, "JSON parse failed: {msg}"),
            ApiError::Network(msg) => write!(f, "network error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}
