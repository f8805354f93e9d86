//! In-memory todo service: a seeded store behind five JSON CRUD routes.
//!
//! State lives for the lifetime of the process only. All routes share one
//! store, guarded by a `tokio::sync::RwLock`.

use std::any::Any;

use axum::{
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::error;

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod model;
pub mod store;

pub use config::{ConfigError, ServerConfig};
pub use error::ApiError;
pub use model::{Todo, TodoPatch};
pub use store::{SharedStore, StoreError, TodoStore};

/// Router over a fresh seeded store.
pub fn app() -> Router {
    app_with_store(TodoStore::seeded().shared())
}

pub fn app_with_store(store: SharedStore) -> Router {
    let routes = Router::new()
        .route("/todos", get(handlers::list_todos).post(handlers::create_todo))
        .route(
            "/todos/{id}",
            get(handlers::get_todo)
                .put(handlers::update_todo)
                .delete(handlers::delete_todo),
        )
        .fallback(handlers::route_not_found)
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .with_state(store);
    with_layers(routes)
}

/// Panics become a JSON 500; every request gets a trace span.
fn with_layers(router: Router) -> Router {
    router
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(detail, "handler panicked");
    ApiError::Internal(error::INTERNAL.to_string()).into_response()
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with_store(listener, TodoStore::seeded().shared()).await
}

pub async fn run_with_store(listener: TcpListener, store: SharedStore) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_store(store)).await
}
