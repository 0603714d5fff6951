//! Project model.
//!
//! # Invariants
//! - `name` is never blank.
//! - `company_id`, when set, references an existing company (checked by the
//!   repository, not here).

use crate::model::common::{
    double_option, require_text, EntityKind, Priority, Timestamp, ValidationError, WorkStatus,
};
use crate::model::company::CompanyId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ProjectId = Uuid;

/// Client project record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub status: WorkStatus,
    pub priority: Priority,
    pub description: Option<String>,
    pub company_id: Option<CompanyId>,
    pub is_archived: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Caller-supplied fields for creating a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProject {
    pub name: String,
    pub status: WorkStatus,
    pub priority: Priority,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub company_id: Option<CompanyId>,
    #[serde(default)]
    pub is_archived: bool,
}

impl NewProject {
    /// Unarchived project with no description or client.
    pub fn new(name: impl Into<String>, status: WorkStatus, priority: Priority) -> Self {
        Self {
            name: name.into(),
            status,
            priority,
            description: None,
            company_id: None,
            is_archived: false,
        }
    }
}

/// Partial update for a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProjectPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<WorkStatus>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub company_id: Option<Option<CompanyId>>,
    #[serde(default)]
    pub is_archived: Option<bool>,
}

impl Project {
    pub fn from_new(input: NewProject, now: Timestamp) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: input.name,
            status: input.status,
            priority: input.priority,
            description: input.description,
            company_id: input.company_id,
            is_archived: input.is_archived,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, patch: ProjectPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(company_id) = patch.company_id {
            self.company_id = company_id;
        }
        if let Some(is_archived) = patch.is_archived {
            self.is_archived = is_archived;
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(EntityKind::Project, "name", &self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::{NewProject, ProjectPatch};

    #[test]
    fn new_project_deserializes_with_literal_enums_and_defaults() {
        let input: NewProject = serde_json::from_str(
            r#"{"name": "Site", "status": "In Progress", "priority": "High"}"#,
        )
        .unwrap();
        assert_eq!(input.name, "Site");
        assert_eq!(input.status.as_str(), "In Progress");
        assert_eq!(input.company_id, None);
        assert!(!input.is_archived);
    }

    #[test]
    fn patch_rejects_unknown_status_literal() {
        let parsed: Result<ProjectPatch, _> = serde_json::from_str(r#"{"status": "Done"}"#);
        assert!(parsed.is_err());
    }
}
