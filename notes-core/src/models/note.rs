use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{NotesError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create/update request body.
///
/// Fields of the wrong JSON type are treated as absent, so `{"title": 5}`
/// fails validation the same way a missing title does.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotePayload {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl NotePayload {
    pub fn new(title: impl Into<String>, content: Option<&str>) -> Self {
        Self {
            title: Some(title.into()),
            content: content.map(str::to_string),
        }
    }

    pub fn from_value(body: &Value) -> Self {
        Self {
            title: body["title"].as_str().map(str::to_string),
            content: body["content"].as_str().map(str::to_string),
        }
    }

    /// Trimmed title, or a validation error when it is missing or blank.
    pub fn require_title(&self) -> Result<String> {
        match self.title.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => Ok(t.to_string()),
            _ => Err(NotesError::validation("Title is required")),
        }
    }
}
