//! Detail resolver: product page to seller storefront

use crate::crawler::document::Document;
use crate::crawler::fetcher::{FetchError, Fetcher};
use crate::crawler::listing::ItemLink;
use crate::crawler::markup;
use crate::crawler::renderer::Renderer;

/// Storefront URL advertised on a product page, if the page has one
///
/// Products sold directly by the platform carry no storefront control.
pub fn find_storefront_link(document: &Document) -> Option<String> {
    document
        .attr(markup::STOREFRONT_LINK, "href")
        .and_then(|href| document.resolve_href(&href))
}

/// Fetches the product page for `item` and looks up its storefront
pub async fn resolve_storefront<R: Renderer>(
    fetcher: &Fetcher<R>,
    item: &ItemLink,
) -> Result<Option<String>, FetchError> {
    let document = fetcher.fetch(&item.url).await?;
    let storefront = find_storefront_link(&document);

    match &storefront {
        Some(url) => tracing::debug!("Storefront for '{}': {}", item.label, url),
        None => tracing::info!("No storefront on {}", item.url),
    }

    Ok(storefront)
}
