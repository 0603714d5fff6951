//! Time entry repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Append and remove logged work; there is deliberately no update path.
//! - Aggregate logged seconds per task and per project.
//!
//! # Invariants
//! - `task_id` must resolve to an existing task on insert.

use crate::model::common::EntityKind;
use crate::model::project::ProjectId;
use crate::model::task::TaskId;
use crate::model::time_entry::{TimeEntry, TimeEntryId};
use crate::repo::{
    check_persisted, ensure_reference, get_timestamp, get_uuid, push_filter, push_order_and_page,
    timestamp_to_db, uuid_value, RepoError, RepoResult,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const TIME_ENTRY_SELECT_SQL: &str = "SELECT
    id,
    task_id,
    user_id,
    duration,
    notes,
    created_at
FROM time_entries";

/// Query options for listing time entries.
#[derive(Debug, Clone, Default)]
pub struct TimeEntryListQuery {
    pub task_id: Option<TaskId>,
    /// Matches entries whose task belongs to this project.
    pub project_id: Option<ProjectId>,
    pub user_id: Option<String>,
    /// Newest entries first instead of insertion order.
    pub newest_first: bool,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for the append-only time ledger.
pub trait TimeEntryRepository {
    fn insert_time_entry(&self, entry: &TimeEntry) -> RepoResult<()>;
    fn get_time_entry(&self, id: TimeEntryId) -> RepoResult<Option<TimeEntry>>;
    fn list_time_entries(&self, query: &TimeEntryListQuery) -> RepoResult<Vec<TimeEntry>>;
    fn delete_time_entry(&self, id: TimeEntryId) -> RepoResult<()>;
    /// Sum of `duration` for one task, `0` when it has no entries.
    fn task_total_seconds(&self, task_id: TaskId) -> RepoResult<u64>;
    /// Sum of `duration` over every task of one project.
    fn project_total_seconds(&self, project_id: ProjectId) -> RepoResult<u64>;
}

/// SQLite-backed time entry repository.
pub struct SqliteTimeEntryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTimeEntryRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn sum_seconds(&self, sql: &str, id: String) -> RepoResult<u64> {
        let total: i64 = self.conn.query_row(sql, [id], |row| row.get(0))?;
        u64::try_from(total)
            .map_err(|_| RepoError::InvalidData(format!("negative duration total {total}")))
    }
}

impl TimeEntryRepository for SqliteTimeEntryRepository<'_> {
    fn insert_time_entry(&self, entry: &TimeEntry) -> RepoResult<()> {
        entry.validate()?;
        ensure_reference(
            self.conn,
            "tasks",
            EntityKind::Task,
            "task_id",
            Some(entry.task_id),
        )?;

        self.conn.execute(
            "INSERT INTO time_entries (
                id,
                task_id,
                user_id,
                duration,
                notes,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                entry.id.to_string(),
                entry.task_id.to_string(),
                entry.user_id.as_str(),
                entry.duration,
                entry.notes.as_deref(),
                timestamp_to_db(&entry.created_at),
            ],
        )?;
        Ok(())
    }

    fn get_time_entry(&self, id: TimeEntryId) -> RepoResult<Option<TimeEntry>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TIME_ENTRY_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_time_entry_row(row)?));
        }
        Ok(None)
    }

    fn list_time_entries(&self, query: &TimeEntryListQuery) -> RepoResult<Vec<TimeEntry>> {
        let mut sql = format!("{TIME_ENTRY_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(task_id) = query.task_id {
            push_filter(&mut sql, &mut bind_values, "task_id = ?", uuid_value(task_id));
        }
        if let Some(project_id) = query.project_id {
            push_filter(
                &mut sql,
                &mut bind_values,
                "task_id IN (SELECT id FROM tasks WHERE project_id = ?)",
                uuid_value(project_id),
            );
        }
        if let Some(user_id) = query.user_id.as_ref() {
            push_filter(
                &mut sql,
                &mut bind_values,
                "user_id = ?",
                Value::Text(user_id.clone()),
            );
        }

        let order_by = if query.newest_first {
            "seq DESC"
        } else {
            "seq ASC"
        };
        push_order_and_page(&mut sql, &mut bind_values, order_by, query.limit, query.offset);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_time_entry_row(row)?);
        }
        Ok(entries)
    }

    fn delete_time_entry(&self, id: TimeEntryId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM time_entries WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: EntityKind::TimeEntry,
                id,
            });
        }
        Ok(())
    }

    fn task_total_seconds(&self, task_id: TaskId) -> RepoResult<u64> {
        self.sum_seconds(
            "SELECT COALESCE(SUM(duration), 0) FROM time_entries WHERE task_id = ?1;",
            task_id.to_string(),
        )
    }

    fn project_total_seconds(&self, project_id: ProjectId) -> RepoResult<u64> {
        self.sum_seconds(
            "SELECT COALESCE(SUM(e.duration), 0)
             FROM time_entries e
             INNER JOIN tasks t ON t.id = e.task_id
             WHERE t.project_id = ?1;",
            project_id.to_string(),
        )
    }
}

fn parse_time_entry_row(row: &Row<'_>) -> RepoResult<TimeEntry> {
    let duration: i64 = row.get("duration")?;
    let duration = u32::try_from(duration).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid duration `{duration}` in time_entries.duration"
        ))
    })?;

    let entry = TimeEntry {
        id: get_uuid(row, "time_entries", "id")?,
        task_id: get_uuid(row, "time_entries", "task_id")?,
        user_id: row.get("user_id")?,
        duration,
        notes: row.get("notes")?,
        created_at: get_timestamp(row, "time_entries", "created_at")?,
    };
    check_persisted("time_entries", entry.id, entry.validate())?;
    Ok(entry)
}
