use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::TodoError;

/// Identifier assigned by the store when a todo is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(Uuid);

impl TodoId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TodoId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for TodoId {
    type Err = TodoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| TodoError::InvalidId(s.to_string()))
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub description: String,
    pub completed: bool,
    pub priority: i64,
}

/// The editable fields of a todo, already coerced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoDraft {
    pub description: String,
    pub priority: i64,
}

impl TodoDraft {
    pub fn parse(description: &str, priority_raw: &str) -> Result<Self, TodoError> {
        Ok(Self {
            description: description.to_string(),
            priority: parse_priority(priority_raw)?,
        })
    }
}

pub fn parse_priority(raw: &str) -> Result<i64, TodoError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TodoError::InvalidInput("priority is required".into()));
    }
    trimmed
        .parse::<i64>()
        .map_err(|_| TodoError::InvalidInput(format!("priority must be an integer, got {raw:?}")))
}

/// The stored body of a todo, without its identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoDocument {
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    pub priority: i64,
}

impl TodoDocument {
    pub fn into_todo(self, id: TodoId) -> Todo {
        Todo {
            id,
            description: self.description,
            completed: self.completed,
            priority: self.priority,
        }
    }
}

impl From<TodoDraft> for TodoDocument {
    fn from(draft: TodoDraft) -> Self {
        Self {
            description: draft.description,
            completed: false,
            priority: draft.priority,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_roundtrips_through_display() {
        let id = TodoId::new();
        let parsed: TodoId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn malformed_id_is_invalid_id() {
        let err = "not-an-id".parse::<TodoId>().unwrap_err();
        assert!(matches!(err, TodoError::InvalidId(ref s) if s == "not-an-id"));
    }

    #[test]
    fn priority_accepts_surrounding_whitespace_and_sign() {
        assert_eq!(parse_priority(" 3 ").unwrap(), 3);
        assert_eq!(parse_priority("-12").unwrap(), -12);
    }

    #[test]
    fn priority_rejects_non_numeric_and_empty() {
        assert!(matches!(parse_priority("high"), Err(TodoError::InvalidInput(_))));
        assert!(matches!(parse_priority(""), Err(TodoError::InvalidInput(_))));
        assert!(matches!(parse_priority("2.5"), Err(TodoError::InvalidInput(_))));
    }

    #[test]
    fn draft_becomes_incomplete_document() {
        let draft = TodoDraft::parse("buy milk", "3").unwrap();
        let doc = TodoDocument::from(draft);
        assert_eq!(doc.description, "buy milk");
        assert_eq!(doc.priority, 3);
        assert!(!doc.completed);
    }

    #[test]
    fn document_without_completed_defaults_to_false() {
        let doc: TodoDocument =
            serde_json::from_str(r#"{"description":"walk dog","priority":1}"#).unwrap();
        assert!(!doc.completed);
    }

    #[test]
    fn todo_serializes_id_as_string() {
        let todo = Todo {
            id: "00000000-0000-0000-0000-000000000000".parse().unwrap(),
            description: "Test".to_string(),
            completed: false,
            priority: 1,
        };
        let json = serde_json::to_value(&todo).unwrap();
        assert_eq!(json["id"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(json["description"], "Test");
        assert_eq!(json["completed"], false);
        assert_eq!(json["priority"], 1);
    }
}
