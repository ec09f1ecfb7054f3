//! Seller extractor
//!
//! Reads the seller facts from a storefront page. Storefronts differ a lot
//! (official stores, brand pages, pages without a reputation widget), so
//! each field has its own accessor and a missing element only ever empties
//! that one field.

use crate::crawler::document::{element_text, Document};
use crate::crawler::fetcher::{FetchError, Fetcher};
use crate::crawler::markup;
use crate::crawler::renderer::Renderer;
use crate::record::Ratings;
use regex::Regex;
use std::sync::LazyLock;

const OFFICIAL_STORE_SUFFIX: &str = " Loja oficial";
const SELLING_MARKER: &str = " vendendo";
const SALES_PERIOD_TOKENS: usize = 4;

static DIGITS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("valid regex"));

/// Seller facts found on one storefront page; `None` means not present
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SellerFields {
    pub vendor_name: Option<String>,
    pub experience: Option<String>,
    pub sales_count: Option<u64>,
    pub sales_period: Option<String>,
    pub status: Option<String>,
    pub location: Option<String>,
    pub ratings: Option<Ratings>,
}

/// Runs every field accessor against a storefront document
pub fn extract_seller_fields(document: &Document) -> SellerFields {
    let sales_text = document.text(markup::SALES_SUBTITLE);

    SellerFields {
        vendor_name: vendor_name(document),
        experience: experience(document),
        sales_count: sales_text.as_deref().and_then(sales_count),
        sales_period: sales_text.as_deref().map(sales_period),
        status: document.text(markup::STATUS_TITLE),
        location: document.text(markup::LOCATION_SUBTITLE),
        ratings: ratings(document),
    }
}

/// Fetches a storefront page and extracts its seller fields
pub async fn extract_seller<R: Renderer>(
    fetcher: &Fetcher<R>,
    storefront_url: &str,
) -> Result<SellerFields, FetchError> {
    let document = fetcher.fetch(storefront_url).await?;
    let fields = extract_seller_fields(&document);

    if fields.vendor_name.is_none() {
        tracing::info!("No vendor name on {}", storefront_url);
    }
    if fields.ratings.is_none() {
        tracing::debug!("No reputation block on {}", storefront_url);
    }

    Ok(fields)
}

/// Store name, falling back to the brand heading
fn vendor_name(document: &Document) -> Option<String> {
    document
        .text(markup::STORE_NAME)
        .or_else(|| document.text(markup::BRAND_NAME))
        .map(|name| clean_vendor_name(&name))
}

/// Removes apostrophes and the trailing "official store" badge text
///
/// Idempotent: cleaning an already clean name returns it unchanged.
pub fn clean_vendor_name(raw: &str) -> String {
    let without_quotes: String = raw.chars().filter(|c| *c != '\'').collect();
    let mut name = without_quotes.trim();
    while let Some(stripped) = name.strip_suffix(OFFICIAL_STORE_SUFFIX) {
        name = stripped.trim_end();
    }
    name.to_string()
}

/// Tenure text, e.g. "5 anos" out of "5 anos vendendo no Mercado Livre"
fn experience(document: &Document) -> Option<String> {
    document.text(markup::EXPERIENCE).map(|text| {
        text.split(SELLING_MARKER)
            .next()
            .unwrap_or_default()
            .trim()
            .to_string()
    })
}

/// First run of digits in the sales subtitle
pub fn sales_count(text: &str) -> Option<u64> {
    parse_count(DIGITS_RE.find(text)?.as_str())
}

/// Last four words of the sales subtitle, e.g. "nos últimos 60 dias"
pub fn sales_period(text: &str) -> String {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let start = tokens.len().saturating_sub(SALES_PERIOD_TOKENS);
    tokens[start..].join(" ")
}

/// Positive, neutral and negative counts, all three or nothing
fn ratings(document: &Document) -> Option<Ratings> {
    let counters = document.find_all(markup::FEEDBACK);
    if counters.is_empty() {
        return None;
    }
    if counters.len() < 3 {
        tracing::warn!(
            "Reputation block on {} has {} counters, expected 3",
            document.url(),
            counters.len()
        );
        return None;
    }

    let counts: Option<Vec<u64>> = counters
        .iter()
        .take(3)
        .map(|el| parenthesized_count(&element_text(*el)))
        .collect();

    match counts.as_deref() {
        Some(&[positive, neutral, negative]) => {
            let ratings = Ratings::new(positive, neutral, negative);
            match ratings.total().map(i64::try_from) {
                Some(Ok(_)) => Some(ratings),
                _ => {
                    tracing::warn!("Reputation counters on {} are out of range", document.url());
                    None
                }
            }
        }
        _ => {
            tracing::warn!("Unreadable reputation counters on {}", document.url());
            None
        }
    }
}

/// Integer between the first `(` and the following `)`
///
/// Digit-group separators are accepted, so "Bom (1.234)" reads as 1234.
pub fn parenthesized_count(text: &str) -> Option<u64> {
    let start = text.find('(')? + 1;
    let end = start + text[start..].find(')')?;
    let digits: String = text[start..end]
        .trim()
        .chars()
        .filter(|c| *c != '.' && *c != ',')
        .collect();
    parse_count(&digits)
}

/// Non-negative integer that fits a warehouse integer column
fn parse_count(digits: &str) -> Option<u64> {
    let value: i64 = digits.parse().ok()?;
    u64::try_from(value).ok()
}
