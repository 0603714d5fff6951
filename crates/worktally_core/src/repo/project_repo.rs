//! Project repository contract and SQLite implementation.
//!
//! # Invariants
//! - `company_id` must resolve to an existing company on insert/update.
//! - Deleting a project cascades to its tasks and their time entries.

use crate::model::common::{EntityKind, Priority, WorkStatus};
use crate::model::company::CompanyId;
use crate::model::project::{Project, ProjectId};
use crate::repo::{
    bool_to_int, check_persisted, count_rows, ensure_reference, get_bool, get_optional_uuid,
    get_status, get_timestamp, get_uuid, push_filter, push_order_and_page, timestamp_to_db,
    uuid_value, CascadeSummary, RepoError, RepoResult, SortKey,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const PROJECT_SELECT_SQL: &str = "SELECT
    id,
    name,
    status,
    priority,
    description,
    company_id,
    is_archived,
    created_at,
    updated_at
FROM projects";

/// Query options for listing projects. Unset filters match everything.
#[derive(Debug, Clone, Default)]
pub struct ProjectListQuery {
    pub company_id: Option<CompanyId>,
    pub status: Option<WorkStatus>,
    pub priority: Option<Priority>,
    /// `Some(false)` hides archived projects, `Some(true)` shows only them.
    pub archived: Option<bool>,
    pub sort: SortKey,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for project CRUD operations.
pub trait ProjectRepository {
    fn insert_project(&self, project: &Project) -> RepoResult<()>;
    fn update_project(&self, project: &Project) -> RepoResult<()>;
    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>>;
    fn list_projects(&self, query: &ProjectListQuery) -> RepoResult<Vec<Project>>;
    fn delete_project(&self, id: ProjectId) -> RepoResult<CascadeSummary>;
}

/// SQLite-backed project repository.
pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn check_references(&self, project: &Project) -> RepoResult<()> {
        ensure_reference(
            self.conn,
            "companies",
            EntityKind::Company,
            "company_id",
            project.company_id,
        )
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn insert_project(&self, project: &Project) -> RepoResult<()> {
        project.validate()?;
        self.check_references(project)?;

        self.conn.execute(
            "INSERT INTO projects (
                id,
                name,
                status,
                priority,
                description,
                company_id,
                is_archived,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                project.id.to_string(),
                project.name.as_str(),
                project.status.as_str(),
                project.priority.as_str(),
                project.description.as_deref(),
                project.company_id.map(|id| id.to_string()),
                bool_to_int(project.is_archived),
                timestamp_to_db(&project.created_at),
                timestamp_to_db(&project.updated_at),
            ],
        )?;
        Ok(())
    }

    fn update_project(&self, project: &Project) -> RepoResult<()> {
        project.validate()?;
        self.check_references(project)?;

        let changed = self.conn.execute(
            "UPDATE projects
             SET
                name = ?2,
                status = ?3,
                priority = ?4,
                description = ?5,
                company_id = ?6,
                is_archived = ?7,
                updated_at = ?8
             WHERE id = ?1;",
            params![
                project.id.to_string(),
                project.name.as_str(),
                project.status.as_str(),
                project.priority.as_str(),
                project.description.as_deref(),
                project.company_id.map(|id| id.to_string()),
                bool_to_int(project.is_archived),
                timestamp_to_db(&project.updated_at),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: EntityKind::Project,
                id: project.id,
            });
        }
        Ok(())
    }

    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROJECT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_project_row(row)?));
        }
        Ok(None)
    }

    fn list_projects(&self, query: &ProjectListQuery) -> RepoResult<Vec<Project>> {
        let mut sql = format!("{PROJECT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(company_id) = query.company_id {
            push_filter(&mut sql, &mut bind_values, "company_id = ?", uuid_value(company_id));
        }
        if let Some(status) = query.status {
            push_filter(
                &mut sql,
                &mut bind_values,
                "status = ?",
                Value::Text(status.as_str().to_string()),
            );
        }
        if let Some(priority) = query.priority {
            push_filter(
                &mut sql,
                &mut bind_values,
                "priority = ?",
                Value::Text(priority.as_str().to_string()),
            );
        }
        if let Some(archived) = query.archived {
            push_filter(
                &mut sql,
                &mut bind_values,
                "is_archived = ?",
                Value::Integer(bool_to_int(archived)),
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
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            projects.push(parse_project_row(row)?);
        }
        Ok(projects)
    }

    fn delete_project(&self, id: ProjectId) -> RepoResult<CascadeSummary> {
        let summary = CascadeSummary {
            tasks: count_rows(
                self.conn,
                "SELECT COUNT(*) FROM tasks WHERE project_id = ?1;",
                id,
            )?,
            time_entries: count_rows(
                self.conn,
                "SELECT COUNT(*)
                 FROM time_entries e
                 INNER JOIN tasks t ON t.id = e.task_id
                 WHERE t.project_id = ?1;",
                id,
            )?,
            ..CascadeSummary::default()
        };

        let changed = self
            .conn
            .execute("DELETE FROM projects WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: EntityKind::Project,
                id,
            });
        }
        Ok(summary)
    }
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    let priority_text: String = row.get("priority")?;
    let priority = priority_text.parse::<Priority>().map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid priority `{priority_text}` in projects.priority"
        ))
    })?;

    let project = Project {
        id: get_uuid(row, "projects", "id")?,
        name: row.get("name")?,
        status: get_status(row, "projects")?,
        priority,
        description: row.get("description")?,
        company_id: get_optional_uuid(row, "projects", "company_id")?,
        is_archived: get_bool(row, "projects", "is_archived")?,
        created_at: get_timestamp(row, "projects", "created_at")?,
        updated_at: get_timestamp(row, "projects", "updated_at")?,
    };
    check_persisted("projects", project.id, project.validate())?;
    Ok(project)
}
