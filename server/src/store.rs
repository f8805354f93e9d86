//! In-memory todo store.
//!
//! Records live in a `Vec` in insertion order next to a monotonically
//! increasing id counter. Nothing is persisted; a restart reseeds.
//! Handlers share one `TodoStore` behind a `RwLock` and run every
//! find-then-mutate sequence under a single write guard.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;

use crate::model::{self, validate_title, TitleError, Todo, TodoPatch};

pub type SharedStore = Arc<RwLock<TodoStore>>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("todo {0} not found")]
    NotFound(i64),
    #[error(transparent)]
    InvalidTitle(#[from] TitleError),
}

#[derive(Debug, Clone)]
pub struct TodoStore {
    todos: Vec<Todo>,
    next_id: i64,
}

impl TodoStore {
    /// A store with no records; the first insert gets id 1.
    pub fn empty() -> Self {
        Self {
            todos: Vec::new(),
            next_id: 1,
        }
    }

    /// The process-start state: two fixed records, next id 3.
    pub fn seeded() -> Self {
        let created_at = model::now();
        Self {
            todos: vec![
                Todo {
                    id: 1,
                    title: "Learn React".to_string(),
                    completed: false,
                    created_at,
                },
                Todo {
                    id: 2,
                    title: "Build a todo app".to_string(),
                    completed: true,
                    created_at,
                },
            ],
            next_id: 3,
        }
    }

    pub fn shared(self) -> SharedStore {
        Arc::new(RwLock::new(self))
    }

    pub fn list(&self) -> &[Todo] {
        &self.todos
    }

    pub fn len(&self) -> usize {
        self.todos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    pub fn find(&self, id: i64) -> Option<&Todo> {
        self.todos.iter().find(|todo| todo.id == id)
    }

    pub fn insert(&mut self, title: &str) -> Result<Todo, StoreError> {
        let title = validate_title(title)?;
        let todo = Todo {
            id: self.next_id,
            title,
            completed: false,
            created_at: model::now(),
        };
        self.next_id += 1;
        self.todos.push(todo.clone());
        Ok(todo)
    }

    /// Apply the fields present in `patch`. The record is untouched unless
    /// every present field is valid.
    pub fn update(&mut self, id: i64, patch: TodoPatch) -> Result<Todo, StoreError> {
        let title = patch.title.as_deref().map(validate_title).transpose()?;
        let todo = self
            .todos
            .iter_mut()
            .find(|todo| todo.id == id)
            .ok_or(StoreError::NotFound(id))?;
        if let Some(title) = title {
            todo.title = title;
        }
        if let Some(completed) = patch.completed {
            todo.completed = completed;
        }
        Ok(todo.clone())
    }

    pub fn delete(&mut self, id: i64) -> Result<Todo, StoreError> {
        let index = self
            .todos
            .iter()
            .position(|todo| todo.id == id)
            .ok_or(StoreError::NotFound(id))?;
        Ok(self.todos.remove(index))
    }
}
