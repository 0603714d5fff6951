//! Entity store: the single entry point for entity CRUD.
//!
//! # Responsibility
//! - Own the SQLite connection and the timestamp clock.
//! - Assign ids and timestamps; callers never set them.
//! - Run every write inside one immediate transaction.
//!
//! # Invariants
//! - All operations are serialized through one mutex, so id uniqueness and
//!   foreign-key checks are atomic with the write they guard.
//! - `update_*` never changes `id` or `created_at` and strictly advances
//!   `updated_at`.
//! - Deletes cascade: company -> projects/articles, project -> tasks,
//!   task -> time entries.
//! - Time entries have no update operation.

use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::article::{Article, ArticleId, ArticlePatch, NewArticle};
use crate::model::common::{EntityKind, ValidationError};
use crate::model::company::{Company, CompanyId, CompanyPatch, NewCompany};
use crate::model::project::{NewProject, Project, ProjectId, ProjectPatch};
use crate::model::task::{NewTask, Task, TaskId, TaskPatch};
use crate::model::time_entry::{NewTimeEntry, TimeEntry, TimeEntryId};
use crate::repo::article_repo::{ArticleListQuery, ArticleRepository, SqliteArticleRepository};
use crate::repo::company_repo::{CompanyListQuery, CompanyRepository, SqliteCompanyRepository};
use crate::repo::project_repo::{ProjectListQuery, ProjectRepository, SqliteProjectRepository};
use crate::repo::task_repo::{SqliteTaskRepository, TaskListQuery, TaskRepository};
use crate::repo::time_entry_repo::{
    SqliteTimeEntryRepository, TimeEntryListQuery, TimeEntryRepository,
};
use crate::repo::{count_table, ensure_connection_ready, CascadeSummary, RepoError, RepoResult};
use crate::service::clock::MonotonicClock;
use log::{debug, info, warn};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;
use uuid::Uuid;

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by entity store operations. None of them are fatal to
/// the store; the failed operation leaves no partial writes behind.
#[derive(Debug)]
pub enum StoreError {
    /// Missing/blank required field or out-of-range value.
    Validation(ValidationError),
    /// Foreign key points at a row that does not exist.
    Reference {
        entity: EntityKind,
        field: &'static str,
        id: Uuid,
    },
    /// Operation targets an unknown id.
    NotFound { entity: EntityKind, id: Uuid },
    /// Storage-level failure.
    Repo(RepoError),
    /// A previous operation panicked while holding the store lock.
    LockPoisoned,
}

impl StoreError {
    /// Stable machine-readable code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Reference { .. } => "reference",
            Self::NotFound { .. } => "not_found",
            Self::Repo(_) => "storage",
            Self::LockPoisoned => "lock_poisoned",
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Reference { entity, field, id } => {
                write!(f, "{field} references unknown {entity}: {id}")
            }
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::LockPoisoned => write!(f, "entity store lock poisoned"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::Reference { entity, field, id } => Self::Reference { entity, field, id },
            RepoError::NotFound { entity, id } => Self::NotFound { entity, id },
            other => Self::Repo(other),
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Repo(RepoError::Db(value))
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(RepoError::from(value))
    }
}

/// Row counts per collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub companies: usize,
    pub projects: usize,
    pub tasks: usize,
    pub time_entries: usize,
    pub articles: usize,
}

struct StoreState {
    conn: Connection,
    clock: MonotonicClock,
}

/// Self-contained entity store. Share across threads with `Arc`.
pub struct EntityStore {
    state: Mutex<StoreState>,
}

impl EntityStore {
    /// Opens (or creates) a database file and migrates it.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::from_connection(open_db(path)?)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(open_db_in_memory()?)
    }

    /// Wraps a migrated connection using the system clock.
    pub fn from_connection(conn: Connection) -> StoreResult<Self> {
        Self::with_clock(conn, MonotonicClock::system())
    }

    /// Wraps a migrated connection with an explicit clock.
    pub fn with_clock(conn: Connection, clock: MonotonicClock) -> StoreResult<Self> {
        ensure_connection_ready(&conn)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self {
            state: Mutex::new(StoreState { conn, clock }),
        })
    }

    // -- Companies --

    pub fn create_company(&self, input: NewCompany) -> StoreResult<Company> {
        self.write("create", EntityKind::Company, |conn, clock| {
            let company = Company::from_new(input, clock.now());
            SqliteCompanyRepository::new(conn).insert_company(&company)?;
            Ok(company)
        })
    }

    pub fn update_company(&self, id: CompanyId, patch: CompanyPatch) -> StoreResult<Company> {
        self.write("update", EntityKind::Company, |conn, clock| {
            let repo = SqliteCompanyRepository::new(conn);
            let mut company = repo
                .get_company(id)?
                .ok_or_else(|| not_found(EntityKind::Company, id))?;
            company.apply(patch);
            company.updated_at = clock.now_after(company.updated_at);
            repo.update_company(&company)?;
            Ok(company)
        })
    }

    pub fn get_company(&self, id: CompanyId) -> StoreResult<Company> {
        self.read(|conn| {
            SqliteCompanyRepository::new(conn)
                .get_company(id)?
                .ok_or_else(|| not_found(EntityKind::Company, id))
        })
    }

    pub fn list_companies(&self, query: &CompanyListQuery) -> StoreResult<Vec<Company>> {
        self.read(|conn| SqliteCompanyRepository::new(conn).list_companies(query))
    }

    /// Deletes a company with its projects (and their tasks and time
    /// entries) and its articles.
    pub fn delete_company(&self, id: CompanyId) -> StoreResult<CascadeSummary> {
        self.write("delete", EntityKind::Company, |conn, _| {
            SqliteCompanyRepository::new(conn).delete_company(id)
        })
    }

    // -- Projects --

    pub fn create_project(&self, input: NewProject) -> StoreResult<Project> {
        self.write("create", EntityKind::Project, |conn, clock| {
            let project = Project::from_new(input, clock.now());
            SqliteProjectRepository::new(conn).insert_project(&project)?;
            Ok(project)
        })
    }

    pub fn update_project(&self, id: ProjectId, patch: ProjectPatch) -> StoreResult<Project> {
        self.write("update", EntityKind::Project, |conn, clock| {
            let repo = SqliteProjectRepository::new(conn);
            let mut project = repo
                .get_project(id)?
                .ok_or_else(|| not_found(EntityKind::Project, id))?;
            project.apply(patch);
            project.updated_at = clock.now_after(project.updated_at);
            repo.update_project(&project)?;
            Ok(project)
        })
    }

    pub fn get_project(&self, id: ProjectId) -> StoreResult<Project> {
        self.read(|conn| {
            SqliteProjectRepository::new(conn)
                .get_project(id)?
                .ok_or_else(|| not_found(EntityKind::Project, id))
        })
    }

    pub fn list_projects(&self, query: &ProjectListQuery) -> StoreResult<Vec<Project>> {
        self.read(|conn| SqliteProjectRepository::new(conn).list_projects(query))
    }

    /// Deletes a project with its tasks and their time entries.
    pub fn delete_project(&self, id: ProjectId) -> StoreResult<CascadeSummary> {
        self.write("delete", EntityKind::Project, |conn, _| {
            SqliteProjectRepository::new(conn).delete_project(id)
        })
    }

    // -- Tasks --

    pub fn create_task(&self, input: NewTask) -> StoreResult<Task> {
        self.write("create", EntityKind::Task, |conn, clock| {
            let task = Task::from_new(input, clock.now());
            SqliteTaskRepository::new(conn).insert_task(&task)?;
            Ok(task)
        })
    }

    pub fn update_task(&self, id: TaskId, patch: TaskPatch) -> StoreResult<Task> {
        self.write("update", EntityKind::Task, |conn, clock| {
            let repo = SqliteTaskRepository::new(conn);
            let mut task = repo
                .get_task(id)?
                .ok_or_else(|| not_found(EntityKind::Task, id))?;
            task.apply(patch);
            task.updated_at = clock.now_after(task.updated_at);
            repo.update_task(&task)?;
            Ok(task)
        })
    }

    pub fn get_task(&self, id: TaskId) -> StoreResult<Task> {
        self.read(|conn| {
            SqliteTaskRepository::new(conn)
                .get_task(id)?
                .ok_or_else(|| not_found(EntityKind::Task, id))
        })
    }

    pub fn list_tasks(&self, query: &TaskListQuery) -> StoreResult<Vec<Task>> {
        self.read(|conn| SqliteTaskRepository::new(conn).list_tasks(query))
    }

    /// Deletes a task with its time entries.
    pub fn delete_task(&self, id: TaskId) -> StoreResult<CascadeSummary> {
        self.write("delete", EntityKind::Task, |conn, _| {
            SqliteTaskRepository::new(conn).delete_task(id)
        })
    }

    // -- Time entries (append-only) --

    pub fn create_time_entry(&self, input: NewTimeEntry) -> StoreResult<TimeEntry> {
        self.write("create", EntityKind::TimeEntry, |conn, clock| {
            let entry = TimeEntry::from_new(input, clock.now());
            SqliteTimeEntryRepository::new(conn).insert_time_entry(&entry)?;
            Ok(entry)
        })
    }

    pub fn get_time_entry(&self, id: TimeEntryId) -> StoreResult<TimeEntry> {
        self.read(|conn| {
            SqliteTimeEntryRepository::new(conn)
                .get_time_entry(id)?
                .ok_or_else(|| not_found(EntityKind::TimeEntry, id))
        })
    }

    pub fn list_time_entries(&self, query: &TimeEntryListQuery) -> StoreResult<Vec<TimeEntry>> {
        self.read(|conn| SqliteTimeEntryRepository::new(conn).list_time_entries(query))
    }

    pub fn delete_time_entry(&self, id: TimeEntryId) -> StoreResult<()> {
        self.write("delete", EntityKind::TimeEntry, |conn, _| {
            SqliteTimeEntryRepository::new(conn).delete_time_entry(id)
        })
    }

    // -- Articles --

    pub fn create_article(&self, input: NewArticle) -> StoreResult<Article> {
        self.write("create", EntityKind::Article, |conn, clock| {
            let article = Article::from_new(input, clock.now());
            SqliteArticleRepository::new(conn).insert_article(&article)?;
            Ok(article)
        })
    }

    pub fn update_article(&self, id: ArticleId, patch: ArticlePatch) -> StoreResult<Article> {
        self.write("update", EntityKind::Article, |conn, clock| {
            let repo = SqliteArticleRepository::new(conn);
            let mut article = repo
                .get_article(id)?
                .ok_or_else(|| not_found(EntityKind::Article, id))?;
            article.apply(patch);
            article.updated_at = clock.now_after(article.updated_at);
            repo.update_article(&article)?;
            Ok(article)
        })
    }

    pub fn get_article(&self, id: ArticleId) -> StoreResult<Article> {
        self.read(|conn| {
            SqliteArticleRepository::new(conn)
                .get_article(id)?
                .ok_or_else(|| not_found(EntityKind::Article, id))
        })
    }

    pub fn list_articles(&self, query: &ArticleListQuery) -> StoreResult<Vec<Article>> {
        self.read(|conn| SqliteArticleRepository::new(conn).list_articles(query))
    }

    pub fn delete_article(&self, id: ArticleId) -> StoreResult<()> {
        self.write("delete", EntityKind::Article, |conn, _| {
            SqliteArticleRepository::new(conn).delete_article(id)
        })
    }

    // -- Derived reads --

    /// Total logged seconds for one task.
    pub fn task_total_seconds(&self, task_id: TaskId) -> StoreResult<u64> {
        self.read(|conn| {
            if SqliteTaskRepository::new(conn).get_task(task_id)?.is_none() {
                return Err(not_found(EntityKind::Task, task_id));
            }
            SqliteTimeEntryRepository::new(conn).task_total_seconds(task_id)
        })
    }

    /// Total logged seconds over all tasks of one project.
    pub fn project_total_seconds(&self, project_id: ProjectId) -> StoreResult<u64> {
        self.read(|conn| {
            if SqliteProjectRepository::new(conn)
                .get_project(project_id)?
                .is_none()
            {
                return Err(not_found(EntityKind::Project, project_id));
            }
            SqliteTimeEntryRepository::new(conn).project_total_seconds(project_id)
        })
    }

    pub fn stats(&self) -> StoreResult<StoreStats> {
        self.read(|conn| {
            Ok(StoreStats {
                companies: count_table(conn, "companies")?,
                projects: count_table(conn, "projects")?,
                tasks: count_table(conn, "tasks")?,
                time_entries: count_table(conn, "time_entries")?,
                articles: count_table(conn, "articles")?,
            })
        })
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, StoreState>> {
        self.state.lock().map_err(|_| StoreError::LockPoisoned)
    }

    fn read<T>(&self, f: impl FnOnce(&Connection) -> RepoResult<T>) -> StoreResult<T> {
        let state = self.lock()?;
        Ok(f(&state.conn)?)
    }

    fn write<T>(
        &self,
        op: &'static str,
        kind: EntityKind,
        f: impl FnOnce(&Connection, &mut MonotonicClock) -> RepoResult<T>,
    ) -> StoreResult<T> {
        let started_at = Instant::now();
        let mut guard = self.lock()?;
        let state = &mut *guard;

        let result = Transaction::new_unchecked(&state.conn, TransactionBehavior::Immediate)
            .map_err(StoreError::from)
            .and_then(|tx| {
                let value = f(&*tx, &mut state.clock)?;
                tx.commit()?;
                Ok(value)
            });

        match &result {
            Ok(_) => info!(
                "event=entity_write module=store status=ok op={} kind={} duration_ms={}",
                op,
                kind,
                started_at.elapsed().as_millis()
            ),
            Err(err @ StoreError::Repo(_)) => warn!(
                "event=entity_write module=store status=error op={} kind={} duration_ms={} error_code={} error={}",
                op,
                kind,
                started_at.elapsed().as_millis(),
                err.code(),
                err
            ),
            Err(err) => debug!(
                "event=entity_write module=store status=rejected op={} kind={} error_code={}",
                op,
                kind,
                err.code()
            ),
        }

        result
    }
}

fn not_found(entity: EntityKind, id: Uuid) -> RepoError {
    RepoError::NotFound { entity, id }
}
