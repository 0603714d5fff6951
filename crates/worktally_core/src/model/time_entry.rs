//! Time entry model.
//!
//! # Invariants
//! - Entries are append-only: there is no patch type and no `updated_at`.
//! - `duration` is whole seconds; negative values are unrepresentable.

use crate::model::common::{require_text, EntityKind, Timestamp, ValidationError};
use crate::model::task::TaskId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type TimeEntryId = Uuid;

/// Logged work against one task by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: TimeEntryId,
    pub task_id: TaskId,
    /// Opaque identifier owned by the surrounding auth system.
    pub user_id: String,
    /// Seconds of work.
    pub duration: u32,
    pub notes: Option<String>,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTimeEntry {
    pub task_id: TaskId,
    pub user_id: String,
    pub duration: u32,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewTimeEntry {
    pub fn new(task_id: TaskId, user_id: impl Into<String>, duration: u32) -> Self {
        Self {
            task_id,
            user_id: user_id.into(),
            duration,
            notes: None,
        }
    }
}

impl TimeEntry {
    pub fn from_new(input: NewTimeEntry, now: Timestamp) -> Self {
        Self {
            id: Uuid::new_v4(),
            task_id: input.task_id,
            user_id: input.user_id,
            duration: input.duration,
            notes: input.notes,
            created_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(EntityKind::TimeEntry, "user_id", &self.user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::NewTimeEntry;

    #[test]
    fn negative_duration_is_rejected_at_the_boundary() {
        let parsed: Result<NewTimeEntry, _> = serde_json::from_str(
            r#"{"task_id": "6f1c2f4e-55a4-4c1e-9a39-3f7d2d4f7b10", "user_id": "u1", "duration": -5}"#,
        );
        assert!(parsed.is_err());
    }
}
