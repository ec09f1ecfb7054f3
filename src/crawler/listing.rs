//! Listing walker
//!
//! Walks the paginated result pages of one seed and collects the product
//! links found on them. Result pages come in two layouts (stack and grid);
//! each page is inspected for whichever one it uses.

use crate::crawler::document::{element_text, Document};
use crate::crawler::fetcher::{FetchError, Fetcher};
use crate::crawler::markup;
use crate::crawler::renderer::Renderer;
use crate::seeds::Seed;
use std::collections::HashSet;

/// A product found on a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemLink {
    /// Product detail page URL
    pub url: String,
    /// Visible link text, kept for logging
    pub label: String,
}

/// Result page layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Stack,
    Grid,
}

impl Layout {
    /// Detection order: when both markers are present, stack wins
    pub const ALL: [Layout; 2] = [Layout::Stack, Layout::Grid];

    pub fn container_selector(self) -> &'static str {
        match self {
            Layout::Stack => markup::STACK_CONTAINER,
            Layout::Grid => markup::GRID_CONTAINER,
        }
    }

    pub fn link_selector(self) -> &'static str {
        match self {
            Layout::Stack => markup::STACK_ITEM_LINK,
            Layout::Grid => markup::GRID_ITEM_LINK,
        }
    }

    /// First layout whose result container is present in `document`
    pub fn detect(document: &Document) -> Option<Layout> {
        Self::ALL
            .into_iter()
            .find(|layout| document.contains(layout.container_selector()))
    }

    /// Item links inside every result container of this layout
    pub fn extract_items(self, document: &Document) -> Vec<ItemLink> {
        let link_selector = format!("{} {}", self.container_selector(), self.link_selector());

        document
            .find_all(&link_selector)
            .into_iter()
            .filter_map(|anchor| {
                let href = anchor.value().attr("href")?;
                let url = document.resolve_href(href)?;
                Some(ItemLink {
                    url,
                    label: element_text(anchor),
                })
            })
            .collect()
    }
}

/// What one listing page contributed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPage {
    pub url: String,
    pub layout: Option<Layout>,
    pub items: Vec<ItemLink>,
    pub next_page: Option<String>,
}

/// Reads layout, item links and the next-page control from a listing page
///
/// A page with neither layout contributes no items, but its next-page
/// control is still honored.
pub fn scan_listing(document: &Document) -> ListingPage {
    let layout = Layout::detect(document);
    let items = layout
        .map(|layout| layout.extract_items(document))
        .unwrap_or_default();
    let next_page = document
        .attr(markup::NEXT_PAGE, "href")
        .and_then(|href| document.resolve_href(&href));

    ListingPage {
        url: document.url().to_string(),
        layout,
        items,
        next_page,
    }
}

/// Page-at-a-time walk over one seed's result pages
///
/// The walk fetches at most `max_pages + 1` pages and never fetches the
/// same URL twice. It is consumed as it goes; walking again means
/// building a new one.
pub struct ListingWalk<'a, R> {
    fetcher: &'a Fetcher<R>,
    pending: Option<String>,
    visited: HashSet<String>,
    max_pages: u32,
    fetched: u32,
    recognized: u32,
}

impl<'a, R: Renderer> ListingWalk<'a, R> {
    pub fn new(fetcher: &'a Fetcher<R>, seed: &Seed, root_url: &str, max_pages: u32) -> Self {
        Self::from_url(fetcher, seed.listing_url(root_url), max_pages)
    }

    /// Starts a walk at an explicit listing URL
    pub fn from_url(fetcher: &'a Fetcher<R>, start_url: String, max_pages: u32) -> Self {
        Self {
            fetcher,
            pending: Some(start_url),
            visited: HashSet::new(),
            max_pages,
            fetched: 0,
            recognized: 0,
        }
    }

    /// Pages fetched so far
    pub fn pages_fetched(&self) -> u32 {
        self.fetched
    }

    /// Pages fetched so far that used a known layout
    pub fn pages_recognized(&self) -> u32 {
        self.recognized
    }

    // Fetched pages bound the walk; recognized pages never exceed them.
    fn budget_exhausted(&self) -> bool {
        self.fetched > self.max_pages
    }

    /// Fetches and scans the next page, or returns `None` when the walk ended
    pub async fn next_page(&mut self) -> Result<Option<ListingPage>, FetchError> {
        if self.budget_exhausted() {
            if let Some(url) = self.pending.take() {
                tracing::debug!("Page budget spent, not following {}", url);
            }
            return Ok(None);
        }

        let Some(url) = self.pending.take() else {
            return Ok(None);
        };
        self.visited.insert(url.clone());

        let page = {
            let document = self.fetcher.fetch(&url).await?;
            scan_listing(&document)
        };
        self.fetched += 1;

        match page.layout {
            Some(layout) => {
                self.recognized += 1;
                tracing::info!(
                    "{} results on page {} ({:?} layout): {}",
                    page.items.len(),
                    self.recognized,
                    layout,
                    url
                );
            }
            None => tracing::info!("No result layout on {}", url),
        }

        self.pending = match &page.next_page {
            Some(next) if self.visited.contains(next) => {
                tracing::warn!("Next page {} was already visited, stopping", next);
                None
            }
            Some(next) => Some(next.clone()),
            None => {
                tracing::info!("No more pages after {}", url);
                None
            }
        };

        Ok(Some(page))
    }

    /// Walks every remaining page and concatenates their item links
    ///
    /// Failing to load the first page is an error; failing on a later page
    /// ends the walk with the links gathered so far.
    pub async fn collect_links(&mut self) -> Result<Vec<ItemLink>, FetchError> {
        let mut links = Vec::new();
        loop {
            match self.next_page().await {
                Ok(Some(page)) => links.extend(page.items),
                Ok(None) => break,
                Err(e) if self.fetched == 0 => return Err(e),
                Err(e) => {
                    tracing::warn!(
                        "Ending walk early after {} pages: {}",
                        self.fetched,
                        e
                    );
                    break;
                }
            }
        }
        Ok(links)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::fetcher::RetryPolicy;
    use crate::crawler::renderer::RenderError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Serves fixed markup per URL and records every request
    struct FixtureRenderer {
        pages: HashMap<String, String>,
        requests: Mutex<Vec<String>>,
    }

    impl FixtureRenderer {
        fn new(pages: &[(&str, String)]) -> Self {
            Self {
                pages: pages
                    .iter()
                    .map(|(u, m)| (u.to_string(), m.clone()))
                    .collect(),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Renderer for FixtureRenderer {
        async fn render(&self, url: &str) -> Result<String, RenderError> {
            self.requests.lock().unwrap().push(url.to_string());
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| RenderError::Transport {
                    url: url.to_string(),
                    message: "no fixture".to_string(),
                })
        }
    }

    fn fetcher(pages: &[(&str, String)]) -> Fetcher<FixtureRenderer> {
        Fetcher::new(
            FixtureRenderer::new(pages),
            RetryPolicy::new(1, Duration::ZERO),
            Duration::ZERO,
        )
    }

    fn requests(fetcher: &Fetcher<FixtureRenderer>) -> Vec<String> {
        fetcher.renderer().requests.lock().unwrap().clone()
    }

    fn stack_page(items: &[&str], next: Option<&str>) -> String {
        let links: String = items
            .iter()
            .map(|u| {
                format!(
                    r#"<li><a class="ui-search-item__group__element ui-search-link" href="{u}">Item {u}</a></li>"#
                )
            })
            .collect();
        let next = next
            .map(|n| format!(r#"<a title="Seguinte" href="{n}">Seguinte</a>"#))
            .unwrap_or_default();
        format!(
            r#"<html><body><ol class="ui-search-layout ui-search-layout--stack">{links}</ol>{next}</body></html>"#
        )
    }

    fn grid_page(items: &[&str], next: Option<&str>) -> String {
        let links: String = items
            .iter()
            .map(|u| {
                format!(r#"<li><a class="ui-search-result__content ui-search-link" href="{u}">Item</a></li>"#)
            })
            .collect();
        let next = next
            .map(|n| format!(r#"<a title="Seguinte" href="{n}">Seguinte</a>"#))
            .unwrap_or_default();
        format!(
            r#"<html><body><ol class="ui-search-layout ui-search-layout--grid">{links}</ol>{next}</body></html>"#
        )
    }

    fn bare_page(next: Option<&str>) -> String {
        let next = next
            .map(|n| format!(r#"<a title="Seguinte" href="{n}">Seguinte</a>"#))
            .unwrap_or_default();
        format!("<html><body><div>Publicidade</div>{next}</body></html>")
    }

    #[test]
    fn test_scan_stack_layout() {
        let doc = Document::parse(
            "https://l.test/a",
            &stack_page(&["https://p.test/1", "https://p.test/2"], Some("https://l.test/b")),
        );
        let page = scan_listing(&doc);
        assert_eq!(page.layout, Some(Layout::Stack));
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].url, "https://p.test/1");
        assert_eq!(page.items[0].label, "Item https://p.test/1");
        assert_eq!(page.next_page, Some("https://l.test/b".to_string()));
    }

    #[test]
    fn test_scan_grid_layout() {
        let doc = Document::parse("https://l.test/a", &grid_page(&["https://p.test/9"], None));
        let page = scan_listing(&doc);
        assert_eq!(page.layout, Some(Layout::Grid));
        assert_eq!(page.items[0].url, "https://p.test/9");
        assert_eq!(page.next_page, None);
    }

    #[test]
    fn test_stack_wins_when_both_present() {
        let markup = format!(
            "{}{}",
            stack_page(&["https://p.test/s"], None),
            grid_page(&["https://p.test/g"], None)
        );
        let doc = Document::parse("https://l.test/a", &markup);
        let page = scan_listing(&doc);
        assert_eq!(page.layout, Some(Layout::Stack));
        assert_eq!(
            page.items.iter().map(|i| i.url.as_str()).collect::<Vec<_>>(),
            vec!["https://p.test/s"]
        );
    }

    #[test]
    fn test_grid_links_ignored_in_stack_layout() {
        let markup = r#"<ol class="ui-search-layout ui-search-layout--stack">
            <a class="ui-search-result__content ui-search-link" href="https://p.test/g">g</a>
        </ol>"#;
        let doc = Document::parse("https://l.test/a", markup);
        let page = scan_listing(&doc);
        assert_eq!(page.layout, Some(Layout::Stack));
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_unrecognized_page_still_reports_next() {
        let doc = Document::parse("https://l.test/a", &bare_page(Some("https://l.test/b")));
        let page = scan_listing(&doc);
        assert_eq!(page.layout, None);
        assert!(page.items.is_empty());
        assert_eq!(page.next_page, Some("https://l.test/b".to_string()));
    }

    #[test]
    fn test_links_without_href_skipped() {
        let markup = r#"<ol class="ui-search-layout ui-search-layout--stack">
            <a class="ui-search-item__group__element ui-search-link">no href</a>
            <a class="ui-search-item__group__element ui-search-link" href="/p/2">relative</a>
        </ol>"#;
        let doc = Document::parse("https://l.test/list", markup);
        let page = scan_listing(&doc);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].url, "https://l.test/p/2");
    }

    #[tokio::test]
    async fn test_walk_accumulates_across_pages() {
        let fetcher = fetcher(&[
            (
                "https://l.test/sp/tv",
                stack_page(&["https://p.test/1"], Some("https://l.test/p2")),
            ),
            (
                "https://l.test/p2",
                grid_page(&["https://p.test/2", "https://p.test/3"], None),
            ),
        ]);
        let mut walk = ListingWalk::new(&fetcher, &Seed::new("sp", "tv"), "https://l.test/", 2);
        let links = walk.collect_links().await.unwrap();
        assert_eq!(walk.pages_fetched(), 2);
        assert_eq!(walk.pages_recognized(), 2);
        let urls: Vec<&str> = links.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(urls, vec!["https://p.test/1", "https://p.test/2", "https://p.test/3"]);
    }

    #[tokio::test]
    async fn test_walk_stops_at_page_budget() {
        let fetcher = fetcher(&[
            ("https://l.test/1", stack_page(&["https://p.test/1"], Some("https://l.test/2"))),
            ("https://l.test/2", stack_page(&["https://p.test/2"], Some("https://l.test/3"))),
            ("https://l.test/3", stack_page(&["https://p.test/3"], Some("https://l.test/4"))),
            ("https://l.test/4", stack_page(&["https://p.test/4"], None)),
        ]);
        let links = ListingWalk::from_url(&fetcher, "https://l.test/1".to_string(), 2)
            .collect_links()
            .await
            .unwrap();
        assert_eq!(links.len(), 3);
        assert_eq!(requests(&fetcher).len(), 3);
    }

    #[tokio::test]
    async fn test_unrecognized_page_does_not_count_as_result_page() {
        let fetcher = fetcher(&[
            ("https://l.test/1", bare_page(Some("https://l.test/2"))),
            ("https://l.test/2", stack_page(&["https://p.test/2"], None)),
        ]);
        let mut walk = ListingWalk::from_url(&fetcher, "https://l.test/1".to_string(), 2);

        let first = walk.next_page().await.unwrap().unwrap();
        assert!(first.items.is_empty());
        assert_eq!(walk.pages_recognized(), 0);
        assert_eq!(walk.pages_fetched(), 1);

        let second = walk.next_page().await.unwrap().unwrap();
        assert_eq!(second.items.len(), 1);
        assert_eq!(walk.pages_recognized(), 1);

        assert!(walk.next_page().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_self_referencing_next_page_terminates() {
        let fetcher = fetcher(&[(
            "https://l.test/1",
            bare_page(Some("https://l.test/1")),
        )]);
        let links = ListingWalk::from_url(&fetcher, "https://l.test/1".to_string(), 2)
            .collect_links()
            .await
            .unwrap();
        assert!(links.is_empty());
        assert_eq!(requests(&fetcher), vec!["https://l.test/1"]);
    }

    #[tokio::test]
    async fn test_cycle_between_pages_terminates() {
        let fetcher = fetcher(&[
            ("https://l.test/1", stack_page(&["https://p.test/1"], Some("https://l.test/2"))),
            ("https://l.test/2", stack_page(&["https://p.test/2"], Some("https://l.test/1"))),
        ]);
        let links = ListingWalk::from_url(&fetcher, "https://l.test/1".to_string(), 5)
            .collect_links()
            .await
            .unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(requests(&fetcher).len(), 2);
    }

    #[tokio::test]
    async fn test_endless_interstitials_bounded_by_max_pages_plus_one() {
        let pages: Vec<(String, String)> = (1..=20)
            .map(|i| {
                (
                    format!("https://l.test/{i}"),
                    bare_page(Some(&format!("https://l.test/{}", i + 1))),
                )
            })
            .collect();
        let pages: Vec<(&str, String)> = pages.iter().map(|(u, m)| (u.as_str(), m.clone())).collect();
        let fetcher = fetcher(&pages);

        for max_pages in [0, 2, 4] {
            fetcher.renderer().requests.lock().unwrap().clear();
            let links = ListingWalk::from_url(&fetcher, "https://l.test/1".to_string(), max_pages)
                .collect_links()
                .await
                .unwrap();
            assert!(links.is_empty());
            assert_eq!(requests(&fetcher).len() as u32, max_pages + 1);
        }
    }

    #[tokio::test]
    async fn test_empty_first_page_yields_nothing() {
        let fetcher = fetcher(&[("https://l.test/sp/none", bare_page(None))]);
        let links = ListingWalk::new(&fetcher, &Seed::new("sp", "none"), "https://l.test/", 2)
            .collect_links()
            .await
            .unwrap();
        assert!(links.is_empty());
        assert_eq!(requests(&fetcher).len(), 1);
    }

    #[tokio::test]
    async fn test_first_page_failure_is_an_error() {
        let fetcher = fetcher(&[]);
        let result = ListingWalk::from_url(&fetcher, "https://l.test/missing".to_string(), 2)
            .collect_links()
            .await;
        assert!(matches!(result, Err(FetchError::Exhausted { .. })));
    }

    #[tokio::test]
    async fn test_later_page_failure_keeps_gathered_links() {
        let fetcher = fetcher(&[(
            "https://l.test/1",
            stack_page(&["https://p.test/1"], Some("https://l.test/missing")),
        )]);
        let links = ListingWalk::from_url(&fetcher, "https://l.test/1".to_string(), 2)
            .collect_links()
            .await
            .unwrap();
        assert_eq!(links.len(), 1);
    }
}
