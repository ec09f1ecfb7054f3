//! Marketplace page markers
//!
//! CSS selectors for the elements the pipeline reads. They mirror the
//! class and id names the marketplace uses on its listing, product and
//! storefront pages.

/// Result container of the stacked (one item per row) listing layout
pub const STACK_CONTAINER: &str = "ol.ui-search-layout.ui-search-layout--stack";
/// Item link inside a stacked listing
pub const STACK_ITEM_LINK: &str = "a.ui-search-item__group__element.ui-search-link";

/// Result container of the grid listing layout
pub const GRID_CONTAINER: &str = "ol.ui-search-layout.ui-search-layout--grid";
/// Item link inside a grid listing
pub const GRID_ITEM_LINK: &str = "a.ui-search-result__content.ui-search-link";

/// Pagination control pointing at the next result page
pub const NEXT_PAGE: &str = r#"a[title="Seguinte"]"#;

/// Product page control that opens the seller storefront
pub const STOREFRONT_LINK: &str = "a.ui-pdp-media__action.ui-box-component__action";

pub const STORE_NAME: &str = "h3#store-info__name";
pub const BRAND_NAME: &str = "h3#brand";
pub const EXPERIENCE: &str = "p.experience";
pub const SALES_SUBTITLE: &str = "p.seller-info__subtitle-sales";
pub const STATUS_TITLE: &str = "p.message__title";
pub const LOCATION_SUBTITLE: &str = "p.location-subtitle";

/// Reputation counters; the page repeats this id on three sibling spans
/// (positive, neutral, negative)
pub const FEEDBACK: &str = "span#feedback_good";
