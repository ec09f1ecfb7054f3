//! Database schema definitions
//!
//! Lead tables are per country: the country code is part of the table
//! name, so one warehouse file can hold several markets side by side.

use crate::config::is_valid_country_code;
use crate::storage::StorageError;

/// Country-specific table names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    /// Curated sellers already handled outside this tool
    pub sellers: String,
    /// Leads found by keyword crawls
    pub leads: String,
}

impl TableNames {
    /// Derives the table names for `country`
    ///
    /// The code is interpolated into SQL, so only uppercase letters, digits
    /// and underscores are accepted.
    pub fn for_country(country: &str) -> Result<Self, StorageError> {
        if !is_valid_country_code(country) {
            return Err(StorageError::InvalidCountry(country.to_string()));
        }
        Ok(Self {
            sellers: format!("{}_meli_sellers", country),
            leads: format!("{}_store_leads_meli_by_keyword", country),
        })
    }
}

/// SQL schema for the country's tables plus the shared run table
pub fn schema_sql(tables: &TableNames) -> String {
    format!(
        r#"
-- Track crawl runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL,
    leads_inserted INTEGER NOT NULL DEFAULT 0
);

-- Sellers that are already known
CREATE TABLE IF NOT EXISTS {sellers} (
    vendor TEXT PRIMARY KEY
);

-- Seller leads
CREATE TABLE IF NOT EXISTS {leads} (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER REFERENCES runs(id),
    location_filter TEXT NOT NULL,
    vendor TEXT NOT NULL,
    category TEXT NOT NULL,
    meli_url TEXT NOT NULL,
    experience TEXT NOT NULL,
    sales INTEGER NOT NULL,
    sales_period TEXT NOT NULL,
    meli_status TEXT NOT NULL,
    total_ratings INTEGER NOT NULL,
    positive_ratings INTEGER NOT NULL,
    neutral_ratings INTEGER NOT NULL,
    negative_ratings INTEGER NOT NULL,
    main_metric_1 TEXT NOT NULL,
    main_metric_2 TEXT NOT NULL,
    location_meli TEXT NOT NULL,
    scrape_datetime TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_{leads}_vendor ON {leads}(vendor);
CREATE INDEX IF NOT EXISTS idx_{leads}_category ON {leads}(category);
"#,
        sellers = tables.sellers,
        leads = tables.leads,
    )
}

/// Initializes the database schema
pub fn initialize_schema(
    conn: &rusqlite::Connection,
    tables: &TableNames,
) -> Result<(), rusqlite::Error> {
    conn.execute_batch(&schema_sql(tables))?;
    Ok(())
}
