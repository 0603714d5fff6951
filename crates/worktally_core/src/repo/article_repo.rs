//! Knowledge-base article repository contract and SQLite implementation.

use crate::model::article::{Article, ArticleId};
use crate::model::common::EntityKind;
use crate::model::company::CompanyId;
use crate::repo::{
    bool_to_int, check_persisted, ensure_reference, get_bool, get_optional_uuid, get_timestamp,
    get_uuid, push_filter, push_order_and_page, timestamp_to_db, uuid_value, RepoError, RepoResult,
    SortKey,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const ARTICLE_SELECT_SQL: &str = "SELECT
    id,
    title,
    content,
    is_public,
    category,
    company_id,
    created_at,
    updated_at
FROM articles";

/// Query options for listing articles.
#[derive(Debug, Clone, Default)]
pub struct ArticleListQuery {
    pub company_id: Option<CompanyId>,
    pub is_public: Option<bool>,
    /// Exact, case-insensitive category match.
    pub category: Option<String>,
    pub sort: SortKey,
    pub limit: Option<u32>,
    pub offset: u32,
}

pub trait ArticleRepository {
    fn insert_article(&self, article: &Article) -> RepoResult<()>;
    fn update_article(&self, article: &Article) -> RepoResult<()>;
    fn get_article(&self, id: ArticleId) -> RepoResult<Option<Article>>;
    fn list_articles(&self, query: &ArticleListQuery) -> RepoResult<Vec<Article>>;
    fn delete_article(&self, id: ArticleId) -> RepoResult<()>;
}

pub struct SqliteArticleRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteArticleRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn check_references(&self, article: &Article) -> RepoResult<()> {
        ensure_reference(
            self.conn,
            "companies",
            EntityKind::Company,
            "company_id",
            article.company_id,
        )
    }
}

impl ArticleRepository for SqliteArticleRepository<'_> {
    fn insert_article(&self, article: &Article) -> RepoResult<()> {
        article.validate()?;
        self.check_references(article)?;

        self.conn.execute(
            "INSERT INTO articles (
                id,
                title,
                content,
                is_public,
                category,
                company_id,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                article.id.to_string(),
                article.title.as_str(),
                article.content.as_str(),
                bool_to_int(article.is_public),
                article.category.as_deref(),
                article.company_id.map(|id| id.to_string()),
                timestamp_to_db(&article.created_at),
                timestamp_to_db(&article.updated_at),
            ],
        )?;
        Ok(())
    }

    fn update_article(&self, article: &Article) -> RepoResult<()> {
        article.validate()?;
        self.check_references(article)?;

        let changed = self.conn.execute(
            "UPDATE articles
             SET
                title = ?2,
                content = ?3,
                is_public = ?4,
                category = ?5,
                company_id = ?6,
                updated_at = ?7
             WHERE id = ?1;",
            params![
                article.id.to_string(),
                article.title.as_str(),
                article.content.as_str(),
                bool_to_int(article.is_public),
                article.category.as_deref(),
                article.company_id.map(|id| id.to_string()),
                timestamp_to_db(&article.updated_at),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: EntityKind::Article,
                id: article.id,
            });
        }
        Ok(())
    }

    fn get_article(&self, id: ArticleId) -> RepoResult<Option<Article>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ARTICLE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_article_row(row)?));
        }
        Ok(None)
    }

    fn list_articles(&self, query: &ArticleListQuery) -> RepoResult<Vec<Article>> {
        let mut sql = format!("{ARTICLE_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(company_id) = query.company_id {
            push_filter(&mut sql, &mut bind_values, "company_id = ?", uuid_value(company_id));
        }
        if let Some(is_public) = query.is_public {
            push_filter(
                &mut sql,
                &mut bind_values,
                "is_public = ?",
                Value::Integer(bool_to_int(is_public)),
            );
        }
        if let Some(category) = query.category.as_ref() {
            push_filter(
                &mut sql,
                &mut bind_values,
                "category = ? COLLATE NOCASE",
                Value::Text(category.clone()),
            );
        }

        let order_by = match query.sort {
            SortKey::Insertion => "seq ASC",
            SortKey::Name => "title COLLATE NOCASE ASC, seq ASC",
            SortKey::RecentlyUpdated => "updated_at DESC, seq ASC",
        };
        push_order_and_page(&mut sql, &mut bind_values, order_by, query.limit, query.offset);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut articles = Vec::new();
        while let Some(row) = rows.next()? {
            articles.push(parse_article_row(row)?);
        }
        Ok(articles)
    }

    fn delete_article(&self, id: ArticleId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM articles WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: EntityKind::Article,
                id,
            });
        }
        Ok(())
    }
}

fn parse_article_row(row: &Row<'_>) -> RepoResult<Article> {
    let article = Article {
        id: get_uuid(row, "articles", "id")?,
        title: row.get("title")?,
        content: row.get("content")?,
        is_public: get_bool(row, "articles", "is_public")?,
        category: row.get("category")?,
        company_id: get_optional_uuid(row, "articles", "company_id")?,
        created_at: get_timestamp(row, "articles", "created_at")?,
        updated_at: get_timestamp(row, "articles", "updated_at")?,
    };
    check_persisted("articles", article.id, article.validate())?;
    Ok(article)
}
