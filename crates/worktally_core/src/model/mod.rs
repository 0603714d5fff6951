//! Domain model for the business-management data layer.
//!
//! # Responsibility
//! - Define the record shapes for companies, projects, tasks, time entries
//!   and knowledge-base articles.
//! - Define create inputs and partial-update patches for each record.
//! - Own field-level validation shared by every write path.
//!
//! # Invariants
//! - Every record is identified by a stable v4 UUID.
//! - `status`/`priority` are closed enums; free-form strings never reach
//!   storage.
//! - Time entries are append-only and carry no `updated_at`.

pub mod article;
pub mod common;
pub mod company;
pub mod project;
pub mod task;
pub mod time_entry;
