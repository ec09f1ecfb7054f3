//! Crawler coordinator - main crawl orchestration logic
//!
//! This module drives a whole run:
//! - Opening the warehouse and loading the vendors it already knows
//! - Walking every seed in order through the per-seed pipeline
//! - Deduplicating and persisting records as they are emitted
//! - Releasing the rendering session, whatever the outcome
//! - Closing the run and reporting its counters

use crate::config::Config;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::pipeline::{crawl_seed, SeedOutcome, WalkSettings};
use crate::crawler::renderer::{open_renderer, Renderer};
use crate::record::SellerRecord;
use crate::seeds::{load_seeds, Seed};
use crate::storage::{LeadStore, RunStatus, SqliteStorage};
use crate::LeadsError;
use std::collections::HashSet;
use std::path::Path;
use std::time::{Duration, Instant};

/// Counters for a whole run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlStats {
    pub seeds: u64,
    pub seeds_aborted: u64,
    pub listing_pages: u64,
    pub items: u64,
    pub items_without_storefront: u64,
    pub items_failed: u64,
    pub records_emitted: u64,
    pub inserted: u64,
    pub skipped_known: u64,
    pub insert_failures: u64,
}

impl CrawlStats {
    fn absorb(&mut self, outcome: &SeedOutcome) {
        self.listing_pages += u64::from(outcome.listing_pages);
        self.items += outcome.items;
        self.items_without_storefront += outcome.items_without_storefront;
        self.items_failed += outcome.items_failed;
        self.records_emitted += outcome.records_emitted;
    }

    fn log_summary(&self, elapsed: Duration) {
        tracing::info!(
            seeds = self.seeds,
            seeds_aborted = self.seeds_aborted,
            listing_pages = self.listing_pages,
            items = self.items,
            items_without_storefront = self.items_without_storefront,
            items_failed = self.items_failed,
            records = self.records_emitted,
            inserted = self.inserted,
            skipped_known = self.skipped_known,
            insert_failures = self.insert_failures,
            "Crawl completed in {:?}",
            elapsed
        );
    }
}

/// Receives emitted records: dedup policy, then insert
struct LeadSink<'a, S> {
    store: &'a mut S,
    known_vendors: HashSet<String>,
    skip_known_vendors: bool,
    inserted: u64,
    skipped_known: u64,
    insert_failures: u64,
}

impl<'a, S: LeadStore> LeadSink<'a, S> {
    fn accept(&mut self, record: SellerRecord) {
        let vendor = record.vendor_name();

        if self.skip_known_vendors && !vendor.is_empty() && self.known_vendors.contains(vendor) {
            tracing::debug!("Vendor '{}' already known, skipping", vendor);
            self.skipped_known += 1;
            return;
        }

        match self.store.insert(&record) {
            Ok(()) => {
                tracing::info!(
                    vendor = %vendor,
                    category = %record.category(),
                    sales = record.sales_count(),
                    ratings = record.total_ratings(),
                    "Stored lead {}",
                    record.meli_url()
                );
                self.inserted += 1;
                if !vendor.is_empty() {
                    self.known_vendors.insert(vendor.to_string());
                }
            }
            Err(e) => {
                tracing::error!("Failed to store lead {}: {}", record.meli_url(), e);
                self.insert_failures += 1;
            }
        }
    }
}

/// Main crawler coordinator structure
pub struct Coordinator<S> {
    config: Config,
    config_hash: String,
    store: S,
}

impl Coordinator<SqliteStorage> {
    /// Creates a coordinator over the warehouse named in the configuration
    pub fn new(config: Config, config_hash: impl Into<String>) -> Result<Self, LeadsError> {
        let store = SqliteStorage::new(
            Path::new(&config.warehouse.database_path),
            &config.warehouse.country,
        )?;
        Ok(Self::with_store(config, config_hash, store))
    }
}

impl<S: LeadStore> Coordinator<S> {
    pub fn with_store(config: Config, config_hash: impl Into<String>, store: S) -> Self {
        Self {
            config,
            config_hash: config_hash.into(),
            store,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Crawls every seed through `renderer`
    ///
    /// The renderer is closed before returning, on success and on failure.
    pub async fn run<R: Renderer>(
        &mut self,
        renderer: R,
        seeds: &[Seed],
    ) -> Result<CrawlStats, LeadsError> {
        let fetcher = Fetcher::from_config(renderer, &self.config.crawler);

        let result = self.crawl_all(&fetcher, seeds).await;

        if let Err(e) = fetcher.close().await {
            tracing::warn!("Failed to close rendering session: {}", e);
        }

        result
    }

    async fn crawl_all<R: Renderer>(
        &mut self,
        fetcher: &Fetcher<R>,
        seeds: &[Seed],
    ) -> Result<CrawlStats, LeadsError> {
        let start_time = Instant::now();
        let settings = WalkSettings::from_config(&self.config.crawler);

        let known_vendors = match self.store.existing_vendor_names() {
            Ok(names) => {
                tracing::info!("{} vendors already in the warehouse", names.len());
                names
            }
            Err(e) => {
                tracing::error!("Failed to load known vendors, continuing without: {}", e);
                HashSet::new()
            }
        };

        let run_id = self.store.create_run(&self.config_hash)?;
        tracing::info!("Starting crawl run {} over {} seeds", run_id, seeds.len());

        let mut stats = CrawlStats::default();
        let mut sink = LeadSink {
            store: &mut self.store,
            known_vendors,
            skip_known_vendors: self.config.crawler.skip_known_vendors,
            inserted: 0,
            skipped_known: 0,
            insert_failures: 0,
        };

        for seed in seeds {
            stats.seeds += 1;
            tracing::info!("Seed {}/{}: {} / {}", stats.seeds, seeds.len(), seed.city, seed.category);

            match crawl_seed(fetcher, &settings, seed, |record| sink.accept(record)).await {
                Ok(outcome) => stats.absorb(&outcome),
                Err(e) => {
                    tracing::error!(
                        city = %seed.city,
                        category = %seed.category,
                        "Skipping seed: {}",
                        e
                    );
                    stats.seeds_aborted += 1;
                }
            }
        }

        stats.inserted = sink.inserted;
        stats.skipped_known = sink.skipped_known;
        stats.insert_failures = sink.insert_failures;

        if let Err(e) = self
            .store
            .finish_run(run_id, RunStatus::Completed, stats.inserted)
        {
            tracing::error!("Failed to complete run {}: {}", run_id, e);
            if let Err(mark_err) = self.store.finish_run(run_id, RunStatus::Failed, stats.inserted) {
                tracing::warn!("Failed to mark run {} as failed: {}", run_id, mark_err);
            }
            return Err(e.into());
        }
        stats.log_summary(start_time.elapsed());

        Ok(stats)
    }
}

/// Runs the main crawl operation
///
/// Loads the seed file, opens the warehouse and the configured renderer,
/// then crawls every seed.
///
/// # Example
///
/// ```no_run
/// use meli_leads::config::load_config_with_hash;
/// use meli_leads::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (config, hash) = load_config_with_hash(Path::new("config.toml"))?;
/// run_crawl(config, &hash).await?;
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config, config_hash: &str) -> Result<CrawlStats, LeadsError> {
    let seeds = load_seeds(Path::new(&config.seeds.path))?;
    tracing::info!("Loaded {} seeds from {}", seeds.len(), config.seeds.path);

    let mut coordinator = Coordinator::new(config, config_hash)?;

    let page_wait = Duration::from_millis(coordinator.config.crawler.page_wait_ms);
    let renderer = open_renderer(&coordinator.config.renderer, page_wait).await?;

    coordinator.run(renderer, &seeds).await
}
