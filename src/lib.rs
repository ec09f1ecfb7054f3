//! Meli-Leads: a marketplace seller-lead harvester
//!
//! This crate walks category listing pages of a marketplace, follows every
//! product to its seller storefront and extracts a fixed set of seller facts
//! (name, tenure, sales volume, reputation, location) into records that are
//! handed to a warehouse.

pub mod config;
pub mod crawler;
pub mod output;
pub mod record;
pub mod seeds;
pub mod storage;

use thiserror::Error;

/// Main error type for Meli-Leads operations
#[derive(Debug, Error)]
pub enum LeadsError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Seed source error: {0}")]
    Seeds(#[from] SeedError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] crawler::FetchError),

    #[error("Renderer error: {0}")]
    Render(#[from] crawler::RenderError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors raised while reading the seed file
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to read seed file {path}: {source}")]
    Read { path: String, source: csv::Error },

    #[error("Seed file {path} is missing required column '{column}'")]
    MissingColumn { path: String, column: &'static str },

    #[error("Malformed seed row {line} in {path}: {source}")]
    Row {
        path: String,
        line: u64,
        source: csv::Error,
    },
}

/// Result type alias for Meli-Leads operations
pub type Result<T> = std::result::Result<T, LeadsError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use record::{Ratings, SellerRecord};
pub use seeds::{load_seeds, Seed};
