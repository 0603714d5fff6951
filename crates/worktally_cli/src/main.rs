//! CLI smoke entry point.
//!
//! # Responsibility
//! - Resolve configuration from the environment (and `.env`, if present).
//! - Open the configured store and print collection counts.
//! - Keep output deterministic for quick local sanity checks.

use std::process::ExitCode;
use worktally_core::{core_version, init_logging, EntityStore, StoreConfig};

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let config = StoreConfig::from_env();

    if let Some(log_dir) = config.log_dir.as_ref() {
        if let Err(err) = init_logging(&config.log_level, log_dir) {
            eprintln!("worktally: logging disabled: {err}");
        }
    }

    println!("worktally_core version={}", core_version());

    let opened = match config.db_path.as_ref() {
        Some(path) => EntityStore::open(path),
        None => EntityStore::open_in_memory(),
    };
    let stats = opened.and_then(|store| store.stats());

    match stats {
        Ok(stats) => {
            println!(
                "companies={} projects={} tasks={} time_entries={} articles={}",
                stats.companies, stats.projects, stats.tasks, stats.time_entries, stats.articles
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("worktally: failed to open store: {err}");
            ExitCode::FAILURE
        }
    }
}
