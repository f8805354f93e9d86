//! Synchronous client core for the todo service.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern), and keeps the view state a
//! front-end renders from: cached list, filter, loading flag, error banner.
//!
//! # Design
//! - `TodoClient` is stateless; it holds only `base_url`.
//! - Each CRUD operation is split into `build_*` and `parse_*`, so the I/O
//!   boundary is explicit.
//! - `TodoView` only changes its cached list after a successful response.
//! - DTOs are defined independently from the server crate; the integration
//!   test catches schema drift.

pub mod client;
pub mod error;
pub mod http;
pub mod types;
pub mod view;

pub use client::TodoClient;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use types::{CreateTodo, DeleteConfirmation, ErrorBody, Todo, UpdateTodo};
pub use view::{
    submittable_title, toggle_completed, EditState, Filter, FilterCounts, TodoInput, TodoView,
};
