//! Configuration module for Meli-Leads
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use meli_leads::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("leads.toml")).unwrap();
//! println!("Walking up to {} extra pages per seed", config.crawler.max_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, RendererConfig, RendererKind, SeedsConfig, WarehouseConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::is_valid_country_code;
