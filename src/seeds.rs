//! Crawl seeds
//!
//! A seed is a `(city, category)` pair read from a flat CSV file. Each seed
//! becomes one listing walk, in file order.

use crate::SeedError;
use serde::Deserialize;
use std::path::Path;

/// One crawl unit: a city filter and a category slug
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Seed {
    pub city: String,
    pub category: String,
}

impl Seed {
    pub fn new(city: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            category: category.into(),
        }
    }

    /// Builds the first listing URL for this seed
    ///
    /// The root is concatenated with `city/category` and every literal `"`
    /// is removed from the result, since seed exports sometimes carry
    /// stray quoting.
    pub fn listing_url(&self, root_url: &str) -> String {
        format!("{}{}/{}", root_url, self.city, self.category).replace('"', "")
    }
}

/// Reads every seed from a CSV file with `city` and `category` columns
///
/// Extra columns are ignored. Rows where either value is blank are skipped
/// with a warning.
pub fn load_seeds(path: &Path) -> Result<Vec<Seed>, SeedError> {
    let path_str = path.display().to_string();
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| SeedError::Read {
            path: path_str.clone(),
            source,
        })?;

    let headers = reader.headers().map_err(|source| SeedError::Read {
        path: path_str.clone(),
        source,
    })?;
    for column in ["city", "category"] {
        if !headers.iter().any(|h| h == column) {
            return Err(SeedError::MissingColumn {
                path: path_str,
                column,
            });
        }
    }

    let mut seeds = Vec::new();
    for row in reader.deserialize::<Seed>() {
        let seed = row.map_err(|source| SeedError::Row {
            path: path_str.clone(),
            line: source.position().map(|p| p.line()).unwrap_or(0),
            source,
        })?;

        if seed.city.is_empty() || seed.category.is_empty() {
            tracing::warn!(
                city = %seed.city,
                category = %seed.category,
                "Skipping seed with a blank column"
            );
            continue;
        }
        seeds.push(seed);
    }

    tracing::debug!("Loaded {} seeds from {}", seeds.len(), path_str);
    Ok(seeds)
}
