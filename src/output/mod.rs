//! Output module for reporting on the lead warehouse
//!
//! This module handles:
//! - Loading aggregate statistics from storage
//! - Printing them for the `--stats` command

pub mod stats;

pub use stats::{load_statistics, print_statistics, WarehouseStatistics};
