//! Seller-lead records
//!
//! A [`SellerRecord`] is the unit of output: one resolved storefront plus
//! the seed it was found under. Records are assembled once and never
//! modified; every best-effort field falls back to its default here.

use crate::crawler::listing::ItemLink;
use crate::crawler::seller::SellerFields;
use crate::seeds::Seed;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Reputation counters of a seller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Ratings {
    pub positive: u64,
    pub neutral: u64,
    pub negative: u64,
}

impl Ratings {
    pub fn new(positive: u64, neutral: u64, negative: u64) -> Self {
        Self {
            positive,
            neutral,
            negative,
        }
    }

    /// Sum of the three counters, `None` if it does not fit in a `u64`
    pub fn total(&self) -> Option<u64> {
        self.positive
            .checked_add(self.neutral)?
            .checked_add(self.negative)
    }
}

/// One seller lead, ready for the warehouse
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SellerRecord {
    location_filter: String,
    vendor_name: String,
    category: String,
    meli_url: String,
    experience: String,
    sales_count: u64,
    sales_period: String,
    status: String,
    total_ratings: u64,
    positive_ratings: u64,
    neutral_ratings: u64,
    negative_ratings: u64,
    main_metric_1: String,
    main_metric_2: String,
    location_meli: String,
    scrape_timestamp: DateTime<Utc>,
}

impl SellerRecord {
    /// Builds a record from extracted fields at a given time
    pub fn assemble(
        seed: &Seed,
        storefront_url: &str,
        fields: SellerFields,
        scraped_at: DateTime<Utc>,
    ) -> Self {
        let (ratings, total) = fields
            .ratings
            .and_then(|r| r.total().map(|total| (r, total)))
            .unwrap_or_default();

        Self {
            location_filter: seed.city.clone(),
            vendor_name: fields.vendor_name.unwrap_or_default(),
            category: seed.category.clone(),
            meli_url: storefront_url.to_string(),
            experience: fields.experience.unwrap_or_default(),
            sales_count: fields.sales_count.unwrap_or(0),
            sales_period: fields.sales_period.unwrap_or_default(),
            status: fields.status.unwrap_or_default(),
            total_ratings: total,
            positive_ratings: ratings.positive,
            neutral_ratings: ratings.neutral,
            negative_ratings: ratings.negative,
            // Reserved columns with no known source on the storefront page
            main_metric_1: String::new(),
            main_metric_2: String::new(),
            location_meli: fields.location.unwrap_or_default(),
            scrape_timestamp: scraped_at,
        }
    }

    pub fn location_filter(&self) -> &str {
        &self.location_filter
    }

    pub fn vendor_name(&self) -> &str {
        &self.vendor_name
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn meli_url(&self) -> &str {
        &self.meli_url
    }

    pub fn experience(&self) -> &str {
        &self.experience
    }

    pub fn sales_count(&self) -> u64 {
        self.sales_count
    }

    pub fn sales_period(&self) -> &str {
        &self.sales_period
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn total_ratings(&self) -> u64 {
        self.total_ratings
    }

    pub fn positive_ratings(&self) -> u64 {
        self.positive_ratings
    }

    pub fn neutral_ratings(&self) -> u64 {
        self.neutral_ratings
    }

    pub fn negative_ratings(&self) -> u64 {
        self.negative_ratings
    }

    pub fn main_metric_1(&self) -> &str {
        &self.main_metric_1
    }

    pub fn main_metric_2(&self) -> &str {
        &self.main_metric_2
    }

    pub fn location_meli(&self) -> &str {
        &self.location_meli
    }

    pub fn scrape_timestamp(&self) -> DateTime<Utc> {
        self.scrape_timestamp
    }
}

/// Assembles the record for one resolved storefront, stamped with the current time
pub fn emit(seed: &Seed, item: &ItemLink, storefront_url: &str, fields: SellerFields) -> SellerRecord {
    let record = SellerRecord::assemble(seed, storefront_url, fields, Utc::now());
    tracing::debug!(
        item = %item.url,
        label = %item.label,
        vendor = %record.vendor_name,
        "Emitted seller record"
    );
    record
}
