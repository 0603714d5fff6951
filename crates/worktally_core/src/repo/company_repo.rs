//! Company repository contract and SQLite implementation.
//!
//! # Invariants
//! - Deleting a company cascades to its projects (and their tasks and time
//!   entries) and its articles.

use crate::model::common::EntityKind;
use crate::model::company::{Company, CompanyId};
use crate::repo::{
    check_persisted, count_rows, get_timestamp, get_uuid, push_order_and_page, timestamp_to_db,
    CascadeSummary, RepoError, RepoResult, SortKey,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const COMPANY_SELECT_SQL: &str = "SELECT
    id,
    name,
    contact,
    address,
    email,
    phone,
    hourly_rate,
    created_at,
    updated_at
FROM companies";

/// Query options for listing companies.
#[derive(Debug, Clone, Default)]
pub struct CompanyListQuery {
    pub sort: SortKey,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for company CRUD operations.
pub trait CompanyRepository {
    fn insert_company(&self, company: &Company) -> RepoResult<()>;
    fn update_company(&self, company: &Company) -> RepoResult<()>;
    fn get_company(&self, id: CompanyId) -> RepoResult<Option<Company>>;
    fn list_companies(&self, query: &CompanyListQuery) -> RepoResult<Vec<Company>>;
    fn delete_company(&self, id: CompanyId) -> RepoResult<CascadeSummary>;
}

/// SQLite-backed company repository.
pub struct SqliteCompanyRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCompanyRepository<'conn> {
    /// Wraps a connection already checked by `ensure_connection_ready`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl CompanyRepository for SqliteCompanyRepository<'_> {
    fn insert_company(&self, company: &Company) -> RepoResult<()> {
        company.validate()?;

        self.conn.execute(
            "INSERT INTO companies (
                id,
                name,
                contact,
                address,
                email,
                phone,
                hourly_rate,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                company.id.to_string(),
                company.name.as_str(),
                company.contact.as_deref(),
                company.address.as_deref(),
                company.email.as_deref(),
                company.phone.as_deref(),
                company.hourly_rate,
                timestamp_to_db(&company.created_at),
                timestamp_to_db(&company.updated_at),
            ],
        )?;
        Ok(())
    }

    fn update_company(&self, company: &Company) -> RepoResult<()> {
        company.validate()?;

        let changed = self.conn.execute(
            "UPDATE companies
             SET
                name = ?2,
                contact = ?3,
                address = ?4,
                email = ?5,
                phone = ?6,
                hourly_rate = ?7,
                updated_at = ?8
             WHERE id = ?1;",
            params![
                company.id.to_string(),
                company.name.as_str(),
                company.contact.as_deref(),
                company.address.as_deref(),
                company.email.as_deref(),
                company.phone.as_deref(),
                company.hourly_rate,
                timestamp_to_db(&company.updated_at),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: EntityKind::Company,
                id: company.id,
            });
        }
        Ok(())
    }

    fn get_company(&self, id: CompanyId) -> RepoResult<Option<Company>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{COMPANY_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_company_row(row)?));
        }
        Ok(None)
    }

    fn list_companies(&self, query: &CompanyListQuery) -> RepoResult<Vec<Company>> {
        let mut sql = format!("{COMPANY_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        let order_by = match query.sort {
            SortKey::Insertion => "seq ASC",
            SortKey::Name => "name COLLATE NOCASE ASC, seq ASC",
            SortKey::RecentlyUpdated => "updated_at DESC, seq ASC",
        };
        push_order_and_page(&mut sql, &mut bind_values, order_by, query.limit, query.offset);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut companies = Vec::new();
        while let Some(row) = rows.next()? {
            companies.push(parse_company_row(row)?);
        }
        Ok(companies)
    }

    fn delete_company(&self, id: CompanyId) -> RepoResult<CascadeSummary> {
        let summary = CascadeSummary {
            projects: count_rows(
                self.conn,
                "SELECT COUNT(*) FROM projects WHERE company_id = ?1;",
                id,
            )?,
            tasks: count_rows(
                self.conn,
                "SELECT COUNT(*)
                 FROM tasks t
                 INNER JOIN projects p ON p.id = t.project_id
                 WHERE p.company_id = ?1;",
                id,
            )?,
            time_entries: count_rows(
                self.conn,
                "SELECT COUNT(*)
                 FROM time_entries e
                 INNER JOIN tasks t ON t.id = e.task_id
                 INNER JOIN projects p ON p.id = t.project_id
                 WHERE p.company_id = ?1;",
                id,
            )?,
            articles: count_rows(
                self.conn,
                "SELECT COUNT(*) FROM articles WHERE company_id = ?1;",
                id,
            )?,
        };

        let changed = self
            .conn
            .execute("DELETE FROM companies WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: EntityKind::Company,
                id,
            });
        }
        Ok(summary)
    }
}

fn parse_company_row(row: &Row<'_>) -> RepoResult<Company> {
    let company = Company {
        id: get_uuid(row, "companies", "id")?,
        name: row.get("name")?,
        contact: row.get("contact")?,
        address: row.get("address")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
        hourly_rate: row.get("hourly_rate")?,
        created_at: get_timestamp(row, "companies", "created_at")?,
        updated_at: get_timestamp(row, "companies", "updated_at")?,
    };
    check_persisted("companies", company.id, company.validate())?;
    Ok(company)
}
