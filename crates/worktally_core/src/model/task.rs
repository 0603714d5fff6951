//! Task model.

use crate::model::common::{
    check_rate, double_option, require_text, EntityKind, Timestamp, ValidationError, WorkStatus,
};
use crate::model::project::ProjectId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type TaskId = Uuid;

/// Unit of work, optionally attached to a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub status: WorkStatus,
    /// Overrides the client rate for this task when set.
    pub hourly_rate: Option<f64>,
    /// Where the work happens (marketplace, tool, site).
    pub platform: Option<String>,
    pub contact_person: Option<String>,
    pub project_id: Option<ProjectId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    pub name: String,
    pub status: WorkStatus,
    #[serde(default)]
    pub hourly_rate: Option<f64>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub contact_person: Option<String>,
    #[serde(default)]
    pub project_id: Option<ProjectId>,
}

impl NewTask {
    pub fn new(name: impl Into<String>, status: WorkStatus) -> Self {
        Self {
            name: name.into(),
            status,
            hourly_rate: None,
            platform: None,
            contact_person: None,
            project_id: None,
        }
    }

    pub fn in_project(mut self, project_id: ProjectId) -> Self {
        self.project_id = Some(project_id);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TaskPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<WorkStatus>,
    #[serde(default, deserialize_with = "double_option")]
    pub hourly_rate: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub platform: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub contact_person: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub project_id: Option<Option<ProjectId>>,
}

impl Task {
    pub fn from_new(input: NewTask, now: Timestamp) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: input.name,
            status: input.status,
            hourly_rate: input.hourly_rate,
            platform: input.platform,
            contact_person: input.contact_person,
            project_id: input.project_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, patch: TaskPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(hourly_rate) = patch.hourly_rate {
            self.hourly_rate = hourly_rate;
        }
        if let Some(platform) = patch.platform {
            self.platform = platform;
        }
        if let Some(contact_person) = patch.contact_person {
            self.contact_person = contact_person;
        }
        if let Some(project_id) = patch.project_id {
            self.project_id = project_id;
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(EntityKind::Task, "name", &self.name)?;
        check_rate(EntityKind::Task, "hourly_rate", self.hourly_rate)?;
        Ok(())
    }
}
