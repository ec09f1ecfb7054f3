//! Crawler module for marketplace page loading and extraction
//!
//! This module contains the core crawling logic, including:
//! - Page rendering backends and the retrying fetcher
//! - Listing pagination and item link extraction
//! - Product to storefront resolution and seller field extraction
//! - Overall crawl coordination

pub mod coordinator;
pub mod detail;
pub mod document;
pub mod fetcher;
pub mod listing;
pub mod markup;
pub mod pipeline;
pub mod renderer;
pub mod seller;

pub use coordinator::{run_crawl, Coordinator, CrawlStats};
pub use detail::{find_storefront_link, resolve_storefront};
pub use document::Document;
pub use fetcher::{retry_fixed, FetchError, Fetcher, RetryPolicy};
pub use listing::{scan_listing, ItemLink, Layout, ListingPage, ListingWalk};
pub use pipeline::{crawl_seed, SeedOutcome, WalkSettings};
pub use renderer::{open_renderer, HttpRenderer, RenderError, Renderer, WebDriverRenderer};
pub use seller::{extract_seller, extract_seller_fields, SellerFields};
