//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define per-entity data access contracts.
//! - Isolate SQLite query details from the entity store.
//! - Share error type, list options and row-parsing helpers.
//!
//! # Invariants
//! - Write paths validate the record and every foreign key before SQL
//!   mutations.
//! - Repository APIs return semantic errors (`NotFound`, `Reference`) in
//!   addition to DB transport errors.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::migrations::{current_user_version, latest_version, REQUIRED_TABLES};
use crate::db::DbError;
use crate::model::common::{
    format_timestamp, parse_timestamp, EntityKind, Timestamp, ValidationError, WorkStatus,
};
use rusqlite::types::Value;
use rusqlite::{Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod article_repo;
pub mod company_repo;
pub mod project_repo;
pub mod task_repo;
pub mod time_entry_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for entity persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Record failed field validation.
    Validation(ValidationError),
    /// Foreign key does not resolve to an existing row of `entity`.
    Reference {
        entity: EntityKind,
        field: &'static str,
        id: Uuid,
    },
    /// Target row does not exist.
    NotFound { entity: EntityKind, id: Uuid },
    Db(DbError),
    /// Persisted data cannot be converted to a valid record.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Reference { entity, field, id } => {
                write!(f, "{field} references unknown {entity}: {id}")
            }
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "entity store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "entity store requires table `{table}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Ordering for list queries. Ties always fall back to insertion order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    /// Oldest insert first.
    #[default]
    Insertion,
    /// Case-insensitive by name (title for articles).
    Name,
    /// Most recently updated first.
    RecentlyUpdated,
}

/// Counts of dependent rows removed by a cascading delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeSummary {
    pub projects: usize,
    pub tasks: usize,
    pub time_entries: usize,
    pub articles: usize,
}

impl CascadeSummary {
    pub fn total(&self) -> usize {
        self.projects + self.tasks + self.time_entries + self.articles
    }
}

/// Checks that a connection carries the migrated entity schema.
pub fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let actual_version = current_user_version(conn)?;
    let expected_version = latest_version();
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in REQUIRED_TABLES {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(*table));
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

pub(crate) fn row_exists(conn: &Connection, table: &str, id: Uuid) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?1);"),
        [id.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

/// Fails with `Reference` when `id` is set and has no row in `table`.
pub(crate) fn ensure_reference(
    conn: &Connection,
    table: &str,
    entity: EntityKind,
    field: &'static str,
    id: Option<Uuid>,
) -> RepoResult<()> {
    match id {
        Some(id) if !row_exists(conn, table, id)? => {
            Err(RepoError::Reference { entity, field, id })
        }
        _ => Ok(()),
    }
}

pub(crate) fn count_rows(conn: &Connection, sql: &str, id: Uuid) -> RepoResult<usize> {
    let count: i64 = conn.query_row(sql, [id.to_string()], |row| row.get(0))?;
    to_count(count)
}

/// Number of rows in one entity table.
pub fn count_table(conn: &Connection, table: &'static str) -> RepoResult<usize> {
    let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })?;
    to_count(count)
}

fn to_count(count: i64) -> RepoResult<usize> {
    usize::try_from(count)
        .map_err(|_| RepoError::InvalidData(format!("negative row count {count}")))
}

/// Appends `ORDER BY` plus `LIMIT`/`OFFSET` clauses and their bindings.
pub(crate) fn push_order_and_page(
    sql: &mut String,
    bind_values: &mut Vec<Value>,
    order_by: &str,
    limit: Option<u32>,
    offset: u32,
) {
    sql.push_str(" ORDER BY ");
    sql.push_str(order_by);

    if let Some(limit) = limit {
        sql.push_str(" LIMIT ?");
        bind_values.push(Value::Integer(i64::from(limit)));
        if offset > 0 {
            sql.push_str(" OFFSET ?");
            bind_values.push(Value::Integer(i64::from(offset)));
        }
    } else if offset > 0 {
        sql.push_str(" LIMIT -1 OFFSET ?");
        bind_values.push(Value::Integer(i64::from(offset)));
    }
}

pub(crate) fn push_filter(
    sql: &mut String,
    bind_values: &mut Vec<Value>,
    clause: &str,
    value: Value,
) {
    sql.push_str(" AND ");
    sql.push_str(clause);
    bind_values.push(value);
}

pub(crate) fn uuid_value(id: Uuid) -> Value {
    Value::Text(id.to_string())
}

pub(crate) fn timestamp_to_db(value: &Timestamp) -> String {
    format_timestamp(value)
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

pub(crate) fn get_uuid(row: &Row<'_>, table: &str, column: &str) -> RepoResult<Uuid> {
    let text: String = row.get(column)?;
    parse_uuid(&text, table, column)
}

pub(crate) fn get_optional_uuid(
    row: &Row<'_>,
    table: &str,
    column: &str,
) -> RepoResult<Option<Uuid>> {
    match row.get::<_, Option<String>>(column)? {
        Some(text) => Ok(Some(parse_uuid(&text, table, column)?)),
        None => Ok(None),
    }
}

fn parse_uuid(text: &str, table: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{text}` in {table}.{column}"))
    })
}

/// Re-checks a record decoded from storage. Rows that fail model validation
/// were written outside this crate and surface as `InvalidData`.
pub(crate) fn check_persisted(
    table: &str,
    id: Uuid,
    checked: Result<(), ValidationError>,
) -> RepoResult<()> {
    checked.map_err(|err| RepoError::InvalidData(format!("{table} row {id}: {err}")))
}

pub(crate) fn get_timestamp(row: &Row<'_>, table: &str, column: &str) -> RepoResult<Timestamp> {
    let text: String = row.get(column)?;
    parse_timestamp(&text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid timestamp `{text}` in {table}.{column}"))
    })
}

pub(crate) fn get_bool(row: &Row<'_>, table: &str, column: &str) -> RepoResult<bool> {
    match row.get::<_, i64>(column)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {table}.{column}"
        ))),
    }
}

pub(crate) fn get_status(row: &Row<'_>, table: &str) -> RepoResult<WorkStatus> {
    let text: String = row.get("status")?;
    text.parse().map_err(|_| {
        RepoError::InvalidData(format!("invalid status `{text}` in {table}.status"))
    })
}
