//! Core data layer for worktally: companies, projects, tasks, time entries
//! and knowledge-base articles.
//! This crate is the single source of truth for entity invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::StoreConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::article::{Article, ArticleId, ArticlePatch, NewArticle};
pub use model::common::{EntityKind, Priority, Timestamp, ValidationError, WorkStatus};
pub use model::company::{Company, CompanyId, CompanyPatch, NewCompany};
pub use model::project::{NewProject, Project, ProjectId, ProjectPatch};
pub use model::task::{NewTask, Task, TaskId, TaskPatch};
pub use model::time_entry::{NewTimeEntry, TimeEntry, TimeEntryId};
pub use repo::article_repo::ArticleListQuery;
pub use repo::company_repo::CompanyListQuery;
pub use repo::project_repo::ProjectListQuery;
pub use repo::task_repo::TaskListQuery;
pub use repo::time_entry_repo::TimeEntryListQuery;
pub use repo::{CascadeSummary, RepoError, RepoResult, SortKey};
pub use service::clock::MonotonicClock;
pub use service::store::{EntityStore, StoreError, StoreResult, StoreStats};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, EntityStore};

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn entity_store_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EntityStore>();
    }
}
