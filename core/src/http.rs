//! HTTP transport types for the host-does-IO pattern.
//!
//! Requests and responses as plain owned data. The core builds
//! `HttpRequest` values and parses `HttpResponse` values; the host executes
//! the round-trip with whatever HTTP stack it has.

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

/// An HTTP request described as plain data, built by `TodoClient::build_*`.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// An HTTP response described as plain data, handed to `TodoClient::parse_*`.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}
