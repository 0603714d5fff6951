//! Core use-case services.
//!
//! # Responsibility
//! - Expose the entity store as the single CRUD entry point.
//! - Keep callers decoupled from repositories and SQL.

pub mod clock;
pub mod store;
