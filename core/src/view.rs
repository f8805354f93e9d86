//! Client view state: the cached list, active filter, loading flag, error
//! banner, the new-todo input and per-row title editing.
//!
//! Nothing here is optimistic. Each `apply_*` takes the parsed outcome of a
//! server round-trip and only touches the cached list on success. Filtering
//! happens locally and is never sent to the server.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ApiError;
use crate::types::{CreateTodo, Todo, UpdateTodo};

pub const FETCH_FAILED: &str = "Failed to fetch todos";
pub const CREATE_FAILED: &str = "Failed to create todo";
pub const UPDATE_FAILED: &str = "Failed to update todo";
pub const DELETE_FAILED: &str = "Failed to delete todo";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    All,
    Completed,
    Incomplete,
}

impl Filter {
    /// In the order the filter bar shows them.
    pub const ALL: [Filter; 3] = [Filter::All, Filter::Incomplete, Filter::Completed];

    pub fn matches(self, todo: &Todo) -> bool {
        match self {
            Filter::All => true,
            Filter::Completed => todo.completed,
            Filter::Incomplete => !todo.completed,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Completed => "completed",
            Filter::Incomplete => "incomplete",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Filter::All => "All",
            Filter::Completed => "Completed",
            Filter::Incomplete => "Active",
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown filter {0:?}")]
pub struct UnknownFilter(pub String);

impl FromStr for Filter {
    type Err = UnknownFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Filter::All),
            "completed" => Ok(Filter::Completed),
            "incomplete" => Ok(Filter::Incomplete),
            other => Err(UnknownFilter(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterCounts {
    pub all: usize,
    pub completed: usize,
    pub incomplete: usize,
}

impl FilterCounts {
    pub fn get(&self, filter: Filter) -> usize {
        match filter {
            Filter::All => self.all,
            Filter::Completed => self.completed,
            Filter::Incomplete => self.incomplete,
        }
    }
}

/// Trimmed title ready to submit, or `None` when the input is blank.
pub fn submittable_title(input: &str) -> Option<String> {
    let title = input.trim();
    (!title.is_empty()).then(|| title.to_string())
}

/// The new-todo text box. While a create is in flight further submits are
/// ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoInput {
    text: String,
    submitting: bool,
}

impl TodoInput {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn can_submit(&self) -> bool {
        !self.submitting && submittable_title(&self.text).is_some()
    }

    /// Trimmed title to send, or `None` when blank or already submitting.
    pub fn begin_submit(&mut self) -> Option<CreateTodo> {
        if self.submitting {
            return None;
        }
        let title = submittable_title(&self.text)?;
        self.submitting = true;
        Some(CreateTodo { title })
    }

    /// The box is cleared once the request settles, whatever the outcome.
    pub fn finish_submit(&mut self) {
        self.text.clear();
        self.submitting = false;
    }
}

/// Inline title editing for one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditState {
    saved_title: String,
    draft: String,
    editing: bool,
}

impl EditState {
    pub fn new(todo: &Todo) -> Self {
        Self {
            saved_title: todo.title.clone(),
            draft: todo.title.clone(),
            editing: false,
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn start(&mut self) {
        self.editing = true;
    }

    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.draft = draft.into();
    }

    /// Drop the draft and go back to the saved title.
    pub fn cancel(&mut self) {
        self.draft = self.saved_title.clone();
        self.editing = false;
    }

    /// Leaves edit mode and returns the update to send. A blank draft sends
    /// nothing and stays in edit mode.
    pub fn save(&mut self) -> Option<UpdateTodo> {
        let title = submittable_title(&self.draft)?;
        self.editing = false;
        Some(UpdateTodo {
            title: Some(title),
            completed: None,
        })
    }

    /// Pick up the server's copy after a successful update.
    pub fn sync(&mut self, todo: &Todo) {
        self.saved_title = todo.title.clone();
        if !self.editing {
            self.draft = todo.title.clone();
        }
    }
}

/// Update that flips the completion checkbox of `todo`.
pub fn toggle_completed(todo: &Todo) -> UpdateTodo {
    UpdateTodo {
        title: None,
        completed: Some(!todo.completed),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoView {
    todos: Vec<Todo>,
    filter: Filter,
    loading: bool,
    error: Option<String>,
}

impl Default for TodoView {
    fn default() -> Self {
        Self::new()
    }
}

impl TodoView {
    /// Empty and loading, the state before the first fetch lands.
    pub fn new() -> Self {
        Self {
            todos: Vec::new(),
            filter: Filter::All,
            loading: true,
            error: None,
        }
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn begin_fetch(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// A failed fetch always reports the generic message.
    pub fn finish_fetch(&mut self, result: Result<Vec<Todo>, ApiError>) {
        match result {
            Ok(todos) => self.todos = todos,
            Err(_) => self.error = Some(FETCH_FAILED.to_string()),
        }
        self.loading = false;
    }

    /// Call before sending a create, update or delete.
    pub fn begin_mutation(&mut self) {
        self.error = None;
    }

    pub fn apply_created(&mut self, result: Result<Todo, ApiError>) {
        match result {
            Ok(todo) => self.todos.push(todo),
            Err(err) => self.fail(&err, CREATE_FAILED),
        }
    }

    pub fn apply_updated(&mut self, result: Result<Todo, ApiError>) {
        match result {
            Ok(updated) => {
                if let Some(slot) = self.todos.iter_mut().find(|todo| todo.id == updated.id) {
                    *slot = updated;
                }
            }
            Err(err) => self.fail(&err, UPDATE_FAILED),
        }
    }

    pub fn apply_deleted<T>(&mut self, id: i64, result: Result<T, ApiError>) {
        match result {
            Ok(_) => self.todos.retain(|todo| todo.id != id),
            Err(err) => self.fail(&err, DELETE_FAILED),
        }
    }

    fn fail(&mut self, err: &ApiError, fallback: &str) {
        self.error = Some(err.server_message().unwrap_or(fallback).to_string());
    }

    pub fn visible(&self) -> Vec<&Todo> {
        self.todos.iter().filter(|todo| self.filter.matches(todo)).collect()
    }

    pub fn counts(&self) -> FilterCounts {
        let completed = self.todos.iter().filter(|todo| todo.completed).count();
        FilterCounts {
            all: self.todos.len(),
            completed,
            incomplete: self.todos.len() - completed,
        }
    }

    /// Placeholder text when the active filter shows nothing.
    pub fn empty_message(&self) -> Option<&'static str> {
        if self.loading || self.todos.iter().any(|todo| self.filter.matches(todo)) {
            return None;
        }
        Some(match self.filter {
            Filter::All => "No todos yet. Create your first todo above!",
            Filter::Completed => "No completed todos.",
            Filter::Incomplete => "No incomplete todos.",
        })
    }
}
