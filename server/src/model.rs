//! Todo record and request-body decoding.
//!
//! Request bodies are decoded from raw bytes into a JSON object first and
//! the known fields are then checked by hand, so a wrong field type can be
//! reported with its own message instead of a generic serde rejection.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Upper bound on a title, counted in characters after trimming.
pub const MAX_TITLE_CHARS: usize = 200;

/// A single todo record as stored and as returned over HTTP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub completed: bool,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Current time truncated to the millisecond precision used on the wire.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TitleError {
    #[error("Title must be a non-empty string")]
    Empty,
    #[error("Title must be 200 characters or less")]
    TooLong,
}

/// Trim `raw` and check it against the title rules. Returns the trimmed title.
pub fn validate_title(raw: &str) -> Result<String, TitleError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(TitleError::Empty);
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(TitleError::TooLong);
    }
    Ok(title.to_string())
}

/// Fields an update may change. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

/// Create payload. The title is still raw here; the store validates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTodo {
    pub title: String,
}

/// Shape errors found while decoding a request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BodyError {
    #[error("Invalid JSON data")]
    InvalidJson,
    #[error("Title is required and must be a non-empty string")]
    TitleRequired,
    #[error(transparent)]
    Title(#[from] TitleError),
    #[error("Completed must be a boolean")]
    CompletedNotBool,
}

fn json_object(body: &[u8]) -> Result<Map<String, Value>, BodyError> {
    serde_json::from_slice(body).map_err(|_| BodyError::InvalidJson)
}

impl CreateTodo {
    pub fn from_json(body: &[u8]) -> Result<Self, BodyError> {
        let object = json_object(body)?;
        match object.get("title") {
            Some(Value::String(title)) => Ok(Self {
                title: title.clone(),
            }),
            _ => Err(BodyError::TitleRequired),
        }
    }
}

impl TodoPatch {
    pub fn from_json(body: &[u8]) -> Result<Self, BodyError> {
        let object = json_object(body)?;
        // title is checked in full before `completed` is looked at
        let title = match object.get("title") {
            None => None,
            Some(Value::String(title)) => Some(validate_title(title)?),
            Some(_) => return Err(TitleError::Empty.into()),
        };
        let completed = match object.get("completed") {
            None => None,
            Some(Value::Bool(completed)) => Some(*completed),
            Some(_) => return Err(BodyError::CompletedNotBool),
        };
        Ok(Self { title, completed })
    }
}

/// `created_at` in the `2024-05-01T12:00:00.000Z` shape.
mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
