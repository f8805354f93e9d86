//! Request handlers for the collection (`/todos`) and item (`/todos/{id}`)
//! routes.
//!
//! Bodies are taken as raw bytes so malformed JSON and wrong field types get
//! the same `{"error": ...}` treatment as every other rejection, whatever the
//! request's content type.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::extract::{RawBody, TodoId};
use crate::model::{CreateTodo, Todo, TodoPatch};
use crate::store::{SharedStore, StoreError};

pub const DELETED_MESSAGE: &str = "Todo deleted successfully";

#[derive(Debug, Serialize)]
pub struct DeleteConfirmation {
    pub message: &'static str,
}

pub async fn list_todos(State(store): State<SharedStore>) -> Json<Vec<Todo>> {
    let store = store.read().await;
    Json(store.list().to_vec())
}

pub async fn create_todo(
    State(store): State<SharedStore>,
    RawBody(body): RawBody,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let input = CreateTodo::from_json(&body).map_err(|err| {
        debug!(%err, "rejected create body");
        ApiError::from(err)
    })?;
    let todo = store.write().await.insert(&input.title).map_err(|err| match err {
        StoreError::InvalidTitle(title) => {
            debug!(%title, "rejected create title");
            ApiError::create_title(title)
        }
        other => other.into(),
    })?;
    info!(id = todo.id, "todo created");
    Ok((StatusCode::CREATED, Json(todo)))
}

pub async fn get_todo(
    State(store): State<SharedStore>,
    TodoId(id): TodoId,
) -> Result<Json<Todo>, ApiError> {
    let store = store.read().await;
    store
        .find(id)
        .cloned()
        .map(Json)
        .ok_or_else(ApiError::todo_not_found)
}

pub async fn update_todo(
    State(store): State<SharedStore>,
    TodoId(id): TodoId,
    RawBody(body): RawBody,
) -> Result<Json<Todo>, ApiError> {
    let mut store = store.write().await;
    if store.find(id).is_none() {
        return Err(ApiError::todo_not_found());
    }
    let patch = TodoPatch::from_json(&body).map_err(|err| {
        debug!(id, %err, "rejected update body");
        ApiError::from(err)
    })?;
    let todo = store.update(id, patch)?;
    info!(id, completed = todo.completed, "todo updated");
    Ok(Json(todo))
}

pub async fn delete_todo(
    State(store): State<SharedStore>,
    TodoId(id): TodoId,
) -> Result<Json<DeleteConfirmation>, ApiError> {
    store.write().await.delete(id)?;
    info!(id, "todo deleted");
    Ok(Json(DeleteConfirmation {
        message: DELETED_MESSAGE,
    }))
}

pub async fn route_not_found() -> ApiError {
    ApiError::NotFound("Not found".to_string())
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed("Method not allowed".to_string())
}
