//! Per-seed pipeline
//!
//! Listing walk, then for every item: storefront lookup, seller extraction
//! and record assembly. Records are handed to a callback as soon as they
//! are built, so persistence can happen while the crawl is still running.

use crate::config::CrawlerConfig;
use crate::crawler::detail::resolve_storefront;
use crate::crawler::fetcher::{FetchError, Fetcher};
use crate::crawler::listing::ListingWalk;
use crate::crawler::renderer::Renderer;
use crate::crawler::seller::extract_seller;
use crate::record::{emit, SellerRecord};
use crate::seeds::Seed;

/// Where listing walks start and how far they go
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkSettings {
    pub root_url: String,
    pub max_pages: u32,
}

impl WalkSettings {
    pub fn new(root_url: impl Into<String>, max_pages: u32) -> Self {
        Self {
            root_url: root_url.into(),
            max_pages,
        }
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(config.root_url.clone(), config.max_pages)
    }
}

/// Counters for one seed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedOutcome {
    pub listing_pages: u32,
    pub items: u64,
    pub items_without_storefront: u64,
    pub items_failed: u64,
    pub records_emitted: u64,
}

/// Crawls one seed, calling `on_record` for every seller record built
///
/// Fails only when the first listing page cannot be loaded. An item whose
/// product or storefront page cannot be loaded is skipped and counted.
pub async fn crawl_seed<R, F>(
    fetcher: &Fetcher<R>,
    settings: &WalkSettings,
    seed: &Seed,
    mut on_record: F,
) -> Result<SeedOutcome, FetchError>
where
    R: Renderer,
    F: FnMut(SellerRecord),
{
    let mut outcome = SeedOutcome::default();

    let mut walk = ListingWalk::new(fetcher, seed, &settings.root_url, settings.max_pages);
    let items = walk.collect_links().await?;
    outcome.listing_pages = walk.pages_fetched();
    outcome.items = items.len() as u64;

    tracing::info!(
        city = %seed.city,
        category = %seed.category,
        pages = walk.pages_fetched(),
        result_pages = walk.pages_recognized(),
        items = items.len(),
        "Listing walk finished"
    );

    for item in &items {
        let storefront = match resolve_storefront(fetcher, item).await {
            Ok(Some(url)) => url,
            Ok(None) => {
                outcome.items_without_storefront += 1;
                continue;
            }
            Err(e) => {
                tracing::warn!("Skipping item {}: {}", item.url, e);
                outcome.items_failed += 1;
                continue;
            }
        };

        let fields = match extract_seller(fetcher, &storefront).await {
            Ok(fields) => fields,
            Err(e) => {
                tracing::warn!("Skipping storefront {}: {}", storefront, e);
                outcome.items_failed += 1;
                continue;
            }
        };

        on_record(emit(seed, item, &storefront, fields));
        outcome.records_emitted += 1;
    }

    Ok(outcome)
}
