//! HTTP-facing errors.
//!
//! Every failure leaves the server as a status code plus a `{"error": ...}`
//! JSON body. The message is the text the client shows to the user.

use axum::{
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::model::{BodyError, TitleError};
use crate::store::StoreError;

pub const INVALID_ID: &str = "Invalid todo ID";
pub const TODO_NOT_FOUND: &str = "Todo not found";
pub const INTERNAL: &str = "Internal server error";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    MethodNotAllowed(String),
    #[error("{0}")]
    PayloadTooLarge(String),
    #[error("{0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ApiError {
    pub fn invalid_id() -> Self {
        ApiError::BadRequest(INVALID_ID.to_string())
    }

    pub fn todo_not_found() -> Self {
        ApiError::NotFound(TODO_NOT_FOUND.to_string())
    }

    /// Title failures on create word the empty case as a missing field.
    pub fn create_title(err: TitleError) -> Self {
        match err {
            TitleError::Empty => BodyError::TitleRequired.into(),
            TitleError::TooLong => ApiError::BadRequest(err.to_string()),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<BodyError> for ApiError {
    fn from(err: BodyError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

/// An unreadable body is malformed input, except when it is too large.
impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => {
                ApiError::PayloadTooLarge("Request body too large".to_string())
            }
            _ => BodyError::InvalidJson.into(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => ApiError::todo_not_found(),
            StoreError::InvalidTitle(title) => ApiError::BadRequest(title.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
