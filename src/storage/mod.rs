//! Storage module for persisting seller leads
//!
//! This module handles all warehouse operations, including:
//! - SQLite database initialization and schema management
//! - Known-vendor lookups for deduplication
//! - Lead inserts
//! - Run tracking

mod schema;
mod sqlite;
mod traits;

pub use schema::TableNames;
pub use sqlite::SqliteStorage;
pub use traits::{LeadStore, StorageError, StorageResult};

use std::path::Path;

/// Opens (or creates) the warehouse for a country
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
/// * `country` - Country code templated into the table names
pub fn open_storage(path: &Path, country: &str) -> StorageResult<SqliteStorage> {
    SqliteStorage::new(path, country)
}

/// Represents a crawl run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
    pub leads_inserted: u64,
}

/// Status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}
