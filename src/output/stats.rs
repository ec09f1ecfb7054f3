//! Statistics generation from the lead warehouse
//!
//! This module provides functionality for extracting and displaying
//! warehouse statistics from the storage layer.

use crate::storage::{LeadStore, RunRecord};
use crate::LeadsError;

/// Warehouse statistics summary
#[derive(Debug, Clone)]
pub struct WarehouseStatistics {
    /// Total number of stored leads
    pub total_leads: u64,

    /// Lead counts per category, largest first
    pub leads_by_category: Vec<(String, u64)>,

    /// Distinct vendor names known to the warehouse
    pub known_vendors: u64,

    /// Most recent crawl run, if any
    pub latest_run: Option<RunRecord>,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `store` - The warehouse to query
///
/// # Returns
///
/// * `Ok(WarehouseStatistics)` - Successfully loaded statistics
/// * `Err(LeadsError)` - Failed to query statistics
pub fn load_statistics(store: &dyn LeadStore) -> Result<WarehouseStatistics, LeadsError> {
    Ok(WarehouseStatistics {
        total_leads: store.count_leads()?,
        leads_by_category: store.count_leads_by_category()?,
        known_vendors: store.existing_vendor_names()?.len() as u64,
        latest_run: store.latest_run()?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &WarehouseStatistics) {
    println!("=== Warehouse Statistics ===\n");

    println!("Overview:");
    println!("  Total leads: {}", stats.total_leads);
    println!("  Known vendors: {}", stats.known_vendors);
    println!();

    if !stats.leads_by_category.is_empty() {
        println!("Leads by Category:");
        for (category, count) in &stats.leads_by_category {
            let percentage = if stats.total_leads > 0 {
                (*count as f64 / stats.total_leads as f64) * 100.0
            } else {
                0.0
            };
            println!("  {}: {} ({:.1}%)", category, count, percentage);
        }
        println!();
    }

    match &stats.latest_run {
        Some(run) => {
            println!("Latest Run:");
            println!("  ID: {}", run.id);
            println!("  Status: {}", run.status.to_db_string());
            println!("  Started: {}", run.started_at);
            println!(
                "  Finished: {}",
                run.finished_at.as_deref().unwrap_or("(not finished)")
            );
            println!("  Leads inserted: {}", run.leads_inserted);
            println!("  Config hash: {}", run.config_hash);
        }
        None => println!("No crawl runs recorded yet."),
    }
}
