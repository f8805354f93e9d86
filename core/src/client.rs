//! Stateless HTTP request builder and response parser for the todo API.
//!
//! `TodoClient` holds only a `base_url`. Each CRUD operation is a `build_*`
//! method producing an `HttpRequest` and a `parse_*` method consuming the
//! matching `HttpResponse`; the caller does the actual I/O in between.

use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{CreateTodo, DeleteConfirmation, ErrorBody, Todo, UpdateTodo};

/// Synchronous, stateless client for the todo API.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/todos", self.base_url)
    }

    fn item_url(&self, id: i64) -> String {
        format!("{}/todos/{id}", self.base_url)
    }

    pub fn build_list_todos(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: self.collection_url(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_get_todo(&self, id: i64) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: self.item_url(id),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_create_todo(&self, input: &CreateTodo) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: self.collection_url(),
            headers: json_headers(),
            body: Some(to_json(input)?),
        })
    }

    pub fn build_update_todo(&self, id: i64, input: &UpdateTodo) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest {
            method: HttpMethod::Put,
            path: self.item_url(id),
            headers: json_headers(),
            body: Some(to_json(input)?),
        })
    }

    pub fn build_delete_todo(&self, id: i64) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: self.item_url(id),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        check_status(&response, 200)?;
        from_json(&response.body)
    }

    pub fn parse_get_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response, 200)?;
        from_json(&response.body)
    }

    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response, 201)?;
        from_json(&response.body)
    }

    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response, 200)?;
        from_json(&response.body)
    }

    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<DeleteConfirmation, ApiError> {
        check_status(&response, 200)?;
        from_json(&response.body)
    }
}

fn json_headers() -> Vec<(String, String)> {
    vec![("content-type".to_string(), "application/json".to_string())]
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string(value).map_err(|e| ApiError::SerializationError(e.to_string()))
}

fn from_json<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant,
/// keeping the server's error text when the body carries one.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    let message = serde_json::from_str::<ErrorBody>(&response.body)
        .ok()
        .map(|body| body.error);
    Err(match response.status {
        404 => ApiError::NotFound { message },
        400 => ApiError::BadRequest { message },
        status => ApiError::HttpError {
            status,
            message,
            body: response.body.clone(),
        },
    })
}
