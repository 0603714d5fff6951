//! Knowledge-base article model.

use crate::model::common::{double_option, require_text, EntityKind, Timestamp, ValidationError};
use crate::model::company::CompanyId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ArticleId = Uuid;

/// Knowledge-base article, optionally scoped to one client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: ArticleId,
    pub title: String,
    pub content: String,
    /// Visible to the client when `true`; internal note otherwise.
    pub is_public: bool,
    pub category: Option<String>,
    pub company_id: Option<CompanyId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewArticle {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub company_id: Option<CompanyId>,
}

impl NewArticle {
    /// Private, uncategorized article.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            is_public: false,
            category: None,
            company_id: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ArticlePatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub is_public: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub category: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub company_id: Option<Option<CompanyId>>,
}

impl Article {
    pub fn from_new(input: NewArticle, now: Timestamp) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            content: input.content,
            is_public: input.is_public,
            category: input.category,
            company_id: input.company_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, patch: ArticlePatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(is_public) = patch.is_public {
            self.is_public = is_public;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(company_id) = patch.company_id {
            self.company_id = company_id;
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(EntityKind::Article, "title", &self.title)?;
        require_text(EntityKind::Article, "content", &self.content)?;
        Ok(())
    }
}
