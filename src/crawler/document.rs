//! Parsed page documents
//!
//! A [`Document`] is the parsed tree of exactly one fetched page. It is
//! queried with CSS selectors (tag name plus attribute predicates) and is
//! dropped as soon as the caller has pulled out what it needs.

use scraper::{ElementRef, Html, Selector};
use url::Url;

/// One parsed page and the URL it was loaded from
#[derive(Debug)]
pub struct Document {
    url: String,
    html: Html,
}

impl Document {
    /// Parses page markup fetched from `url`
    pub fn parse(url: &str, markup: &str) -> Self {
        Self {
            url: url.to_string(),
            html: Html::parse_document(markup),
        }
    }

    /// The URL this document was fetched from
    pub fn url(&self) -> &str {
        &self.url
    }

    /// First element matching `css`, if any
    pub fn find(&self, css: &str) -> Option<ElementRef<'_>> {
        let selector = parse_selector(css)?;
        let first = self.html.select(&selector).next();
        first
    }

    /// Every element matching `css`, in document order
    pub fn find_all(&self, css: &str) -> Vec<ElementRef<'_>> {
        let Some(selector) = parse_selector(css) else {
            return Vec::new();
        };
        let all = self.html.select(&selector).collect();
        all
    }

    /// Whether at least one element matches `css`
    pub fn contains(&self, css: &str) -> bool {
        self.find(css).is_some()
    }

    /// Trimmed text of the first element matching `css`
    pub fn text(&self, css: &str) -> Option<String> {
        self.find(css).map(element_text)
    }

    /// Value of `attr` on the first element matching `css`
    pub fn attr(&self, css: &str, attr: &str) -> Option<String> {
        self.find(css)
            .and_then(|el| el.value().attr(attr))
            .map(str::to_string)
    }

    /// Turns an href found in this document into a URL to fetch
    ///
    /// Absolute hrefs are returned verbatim; relative ones are joined onto
    /// the document URL. Empty or unresolvable hrefs yield `None`.
    pub fn resolve_href(&self, href: &str) -> Option<String> {
        let href = href.trim();
        if href.is_empty() || href.starts_with('#') {
            return None;
        }

        if Url::parse(href).is_ok() {
            return Some(href.to_string());
        }

        Url::parse(&self.url)
            .and_then(|base| base.join(href))
            .map(|u| u.to_string())
            .ok()
    }
}

/// Concatenated, trimmed text content of an element and its descendants
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn parse_selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            tracing::error!("Invalid selector '{}': {:?}", css, e);
            None
        }
    }
}
