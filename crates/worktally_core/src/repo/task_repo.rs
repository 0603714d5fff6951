//! Task repository contract and SQLite implementation.
//!
//! # Invariants
//! - `project_id` must resolve to an existing project on insert/update.
//! - Deleting a task cascades to its time entries.

use crate::model::common::{EntityKind, WorkStatus};
use crate::model::project::ProjectId;
use crate::model::task::{Task, TaskId};
use crate::repo::{
    check_persisted, count_rows, ensure_reference, get_optional_uuid, get_status, get_timestamp,
    get_uuid, push_filter, push_order_and_page, timestamp_to_db, uuid_value, CascadeSummary,
    RepoError, RepoResult, SortKey,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const TASK_SELECT_SQL: &str = "SELECT
    id,
    name,
    status,
    hourly_rate,
    platform,
    contact_person,
    project_id,
    created_at,
    updated_at
FROM tasks";

/// Query options for listing tasks.
#[derive(Debug, Clone, Default)]
pub struct TaskListQuery {
    pub project_id: Option<ProjectId>,
    pub status: Option<WorkStatus>,
    pub sort: SortKey,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for task CRUD operations.
pub trait TaskRepository {
    fn insert_task(&self, task: &Task) -> RepoResult<()>;
    fn update_task(&self, task: &Task) -> RepoResult<()>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>>;
    fn delete_task(&self, id: TaskId) -> RepoResult<CascadeSummary>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn check_references(&self, task: &Task) -> RepoResult<()> {
        ensure_reference(
            self.conn,
            "projects",
            EntityKind::Project,
            "project_id",
            task.project_id,
        )
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn insert_task(&self, task: &Task) -> RepoResult<()> {
        task.validate()?;
        self.check_references(task)?;

        self.conn.execute(
            "INSERT INTO tasks (
                id,
                name,
                status,
                hourly_rate,
                platform,
                contact_person,
                project_id,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                task.id.to_string(),
                task.name.as_str(),
                task.status.as_str(),
                task.hourly_rate,
                task.platform.as_deref(),
                task.contact_person.as_deref(),
                task.project_id.map(|id| id.to_string()),
                timestamp_to_db(&task.created_at),
                timestamp_to_db(&task.updated_at),
            ],
        )?;
        Ok(())
    }

    fn update_task(&self, task: &Task) -> RepoResult<()> {
        task.validate()?;
        self.check_references(task)?;

        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                name = ?2,
                status = ?3,
                hourly_rate = ?4,
                platform = ?5,
                contact_person = ?6,
                project_id = ?7,
                updated_at = ?8
             WHERE id = ?1;",
            params![
                task.id.to_string(),
                task.name.as_str(),
                task.status.as_str(),
                task.hourly_rate,
                task.platform.as_deref(),
                task.contact_person.as_deref(),
                task.project_id.map(|id| id.to_string()),
                timestamp_to_db(&task.updated_at),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: EntityKind::Task,
                id: task.id,
            });
        }
        Ok(())
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }
        Ok(None)
    }

    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>> {
        let mut sql = format!("{TASK_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(project_id) = query.project_id {
            push_filter(&mut sql, &mut bind_values, "project_id = ?", uuid_value(project_id));
        }
        if let Some(status) = query.status {
            push_filter(
                &mut sql,
                &mut bind_values,
                "status = ?",
                Value::Text(status.as_str().to_string()),
            );
        }

        let order_by = match query.sort {
            SortKey::Insertion => "seq ASC",
            SortKey::Name => "name COLLATE NOCASE ASC, seq ASC",
            SortKey::RecentlyUpdated => "updated_at DESC, seq ASC",
        };
        push_order_and_page(&mut sql, &mut bind_values, order_by, query.limit, query.offset);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<CascadeSummary> {
        let summary = CascadeSummary {
            time_entries: count_rows(
                self.conn,
                "SELECT COUNT(*) FROM time_entries WHERE task_id = ?1;",
                id,
            )?,
            ..CascadeSummary::default()
        };

        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: EntityKind::Task,
                id,
            });
        }
        Ok(summary)
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let task = Task {
        id: get_uuid(row, "tasks", "id")?,
        name: row.get("name")?,
        status: get_status(row, "tasks")?,
        hourly_rate: row.get("hourly_rate")?,
        platform: row.get("platform")?,
        contact_person: row.get("contact_person")?,
        project_id: get_optional_uuid(row, "tasks", "project_id")?,
        created_at: get_timestamp(row, "tasks", "created_at")?,
        updated_at: get_timestamp(row, "tasks", "updated_at")?,
    };
    check_persisted("tasks", task.id, task.validate())?;
    Ok(task)
}
