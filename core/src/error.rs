//! Error types for the todo API client.
//!
//! 404 and 400 get dedicated variants since callers react to them
//! differently from an unexpected status. Whenever the server sent an
//! `{"error": ...}` body, its text is kept in `message`.

use thiserror::Error;

/// Errors returned by `TodoClient` build and parse methods.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404.
    #[error("resource not found")]
    NotFound { message: Option<String> },

    /// The server returned 400: bad id, bad body, or invalid field.
    #[error("bad request")]
    BadRequest { message: Option<String> },

    /// Any other non-success status.
    #[error("HTTP {status}: {body}")]
    HttpError {
        status: u16,
        message: Option<String>,
        body: String,
    },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}

impl ApiError {
    /// The text of the server's `{"error": ...}` body, if there was one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::NotFound { message }
            | ApiError::BadRequest { message }
            | ApiError::HttpError { message, .. } => message.as_deref(),
            ApiError::DeserializationError(_) | ApiError::SerializationError(_) => None,
        }
    }
}
