//! Storage traits and error types
//!
//! This module defines the trait interface for lead warehouses and
//! associated error types.

use crate::record::SellerRecord;
use crate::storage::{RunRecord, RunStatus};
use std::collections::HashSet;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid country code for table names: {0:?}")]
    InvalidCountry(String),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Value {value} for column {column} does not fit an SQLite integer")]
    OutOfRange { column: &'static str, value: u64 },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for lead warehouse implementations
pub trait LeadStore {
    // ===== Leads =====

    /// Vendor names the warehouse already knows about
    ///
    /// Covers the curated sellers table and every lead inserted so far.
    fn existing_vendor_names(&self) -> StorageResult<HashSet<String>>;

    /// Appends one lead, attributed to the current run if one is open
    fn insert(&mut self, record: &SellerRecord) -> StorageResult<()>;

    // ===== Run Management =====

    /// Creates a new crawl run
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration file
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Closes a run with its final status and the number of leads it inserted
    fn finish_run(&mut self, run_id: i64, status: RunStatus, inserted: u64)
        -> StorageResult<()>;

    /// Gets the most recent run
    fn latest_run(&self) -> StorageResult<Option<RunRecord>>;

    // ===== Statistics =====

    /// Total number of stored leads
    fn count_leads(&self) -> StorageResult<u64>;

    /// Lead counts per category, largest first
    fn count_leads_by_category(&self) -> StorageResult<Vec<(String, u64)>>;
}
