//! HTTP transport types.
//!
//! # Design
//! Requests and responses are described as plain data so that URL
//! construction, parameter merging and response parsing can be exercised
//! without a network. `Dhis2Client::build_request` produces an
//! `HttpRequest`; the client's `request` method executes it, but tests (or
//! callers with their own transport) can run the round-trip themselves and
//! hand the resulting `HttpResponse` to `Dhis2Client::parse_response`.

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// An HTTP request described as plain data.
///
/// `url` is the fully composed target including the serialized query
/// string. Headers always carry `Content-Type` and `Accept` set to
/// `application/json`; `body` is the JSON-serialized payload when present.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// An HTTP response described as plain data, ready for status
/// interpretation and JSON parsing.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}
