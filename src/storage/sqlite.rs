//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the LeadStore trait.

use crate::record::SellerRecord;
use crate::storage::schema::{initialize_schema, TableNames};
use crate::storage::traits::{LeadStore, StorageError, StorageResult};
use crate::storage::{RunRecord, RunStatus};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashSet;
use std::path::Path;

/// SQLite warehouse backend
pub struct SqliteStorage {
    conn: Connection,
    tables: TableNames,
    current_run: Option<i64>,
}

impl SqliteStorage {
    /// Opens or creates the warehouse at `path`
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    /// * `country` - Country code templated into the lead table names
    pub fn new(path: &Path, country: &str) -> StorageResult<Self> {
        let tables = TableNames::for_country(country)?;
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn, &tables)?;

        tracing::debug!("Opened warehouse {} ({})", path.display(), tables.leads);

        Ok(Self {
            conn,
            tables,
            current_run: None,
        })
    }

    /// Creates an in-memory warehouse
    pub fn new_in_memory(country: &str) -> StorageResult<Self> {
        let tables = TableNames::for_country(country)?;
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn, &tables)?;
        Ok(Self {
            conn,
            tables,
            current_run: None,
        })
    }

    pub fn tables(&self) -> &TableNames {
        &self.tables
    }

    /// Adds a vendor to the curated sellers table
    ///
    /// Returns `false` when the vendor was already there.
    pub fn register_seller(&mut self, vendor: &str) -> StorageResult<bool> {
        let changed = self.conn.execute(
            &format!(
                "INSERT OR IGNORE INTO {} (vendor) VALUES (?1)",
                self.tables.sellers
            ),
            params![vendor],
        )?;
        Ok(changed > 0)
    }

    fn read_run(row: &rusqlite::Row<'_>) -> rusqlite::Result<RunRecord> {
        Ok(RunRecord {
            id: row.get(0)?,
            started_at: row.get(1)?,
            finished_at: row.get(2)?,
            config_hash: row.get(3)?,
            status: RunStatus::from_db_string(&row.get::<_, String>(4)?)
                .unwrap_or(RunStatus::Failed),
            leads_inserted: row.get::<_, i64>(5)? as u64,
        })
    }
}

fn sql_integer(column: &'static str, value: u64) -> StorageResult<i64> {
    i64::try_from(value).map_err(|_| StorageError::OutOfRange { column, value })
}

impl LeadStore for SqliteStorage {
    // ===== Leads =====

    fn existing_vendor_names(&self) -> StorageResult<HashSet<String>> {
        let query = format!(
            "SELECT vendor FROM {} UNION SELECT vendor FROM {}",
            self.tables.sellers, self.tables.leads
        );

        let mut stmt = self.conn.prepare(&query)?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<HashSet<_>, _>>()?;

        Ok(names)
    }

    fn insert(&mut self, record: &SellerRecord) -> StorageResult<()> {
        let query = format!(
            "INSERT INTO {} (
                run_id, location_filter, vendor, category, meli_url, experience,
                sales, sales_period, meli_status, total_ratings, positive_ratings,
                neutral_ratings, negative_ratings, main_metric_1, main_metric_2,
                location_meli, scrape_datetime
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
            self.tables.leads
        );

        let sales = sql_integer("sales", record.sales_count())?;
        let total = sql_integer("total_ratings", record.total_ratings())?;
        let positive = sql_integer("positive_ratings", record.positive_ratings())?;
        let neutral = sql_integer("neutral_ratings", record.neutral_ratings())?;
        let negative = sql_integer("negative_ratings", record.negative_ratings())?;

        self.conn.execute(
            &query,
            params![
                self.current_run,
                record.location_filter(),
                record.vendor_name(),
                record.category(),
                record.meli_url(),
                record.experience(),
                sales,
                record.sales_period(),
                record.status(),
                total,
                positive,
                neutral,
                negative,
                record.main_metric_1(),
                record.main_metric_2(),
                record.location_meli(),
                record.scrape_timestamp().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        let run_id = self.conn.last_insert_rowid();
        self.current_run = Some(run_id);
        Ok(run_id)
    }

    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        inserted: u64,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let changed = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, leads_inserted = ?3 WHERE id = ?4",
            params![status.to_db_string(), now, inserted as i64, run_id],
        )?;
        if changed == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        if self.current_run == Some(run_id) {
            self.current_run = None;
        }
        Ok(())
    }

    fn latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                "SELECT id, started_at, finished_at, config_hash, status, leads_inserted
                 FROM runs ORDER BY id DESC LIMIT 1",
                [],
                Self::read_run,
            )
            .optional()?;

        Ok(run)
    }

    // ===== Statistics =====

    fn count_leads(&self) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", self.tables.leads),
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_leads_by_category(&self) -> StorageResult<Vec<(String, u64)>> {
        let query = format!(
            "SELECT category, COUNT(*) AS count FROM {}
             GROUP BY category ORDER BY count DESC, category",
            self.tables.leads
        );

        let mut stmt = self.conn.prepare(&query)?;
        let counts = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get::<_, i64>(1)? as u64)))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(counts)
    }
}
