//! Rendering collaborators
//!
//! A [`Renderer`] turns a URL into page markup. Two backends exist:
//! - [`WebDriverRenderer`] drives one browser session over WebDriver and
//!   returns the markup after scripts ran
//! - [`HttpRenderer`] performs a plain GET, useful for static mirrors and tests
//!
//! Exactly one session is opened per crawl and it serves every fetch.

use crate::config::{RendererConfig, RendererKind};
use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by a rendering backend
///
/// Every variant is treated as transient by the fetcher.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Unexpected status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to open WebDriver session: {0}")]
    Session(#[from] fantoccini::error::NewSessionError),

    #[error("WebDriver command failed: {0}")]
    Command(#[from] fantoccini::error::CmdError),

    #[error("Transport error for {url}: {message}")]
    Transport { url: String, message: String },
}

/// Something that can load a URL and hand back its rendered markup
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Loads `url` and returns the page markup
    async fn render(&self, url: &str) -> Result<String, RenderError>;

    /// Releases the underlying session
    async fn close(&self) -> Result<(), RenderError> {
        Ok(())
    }
}

/// Renderer backed by a WebDriver browser session
pub struct WebDriverRenderer {
    client: Client,
    page_wait: Duration,
}

impl WebDriverRenderer {
    /// Opens a browser session at `webdriver_url`
    ///
    /// The browser is started with notification prompts blocked so they never
    /// cover the page being read.
    pub async fn connect(webdriver_url: &str, page_wait: Duration) -> Result<Self, RenderError> {
        let mut builder = ClientBuilder::native();
        builder.capabilities(browser_capabilities());
        let client = builder.connect(webdriver_url).await?;

        tracing::info!("Connected to WebDriver at {}", webdriver_url);
        Ok(Self { client, page_wait })
    }
}

fn browser_capabilities() -> serde_json::Map<String, serde_json::Value> {
    let mut caps = serde_json::Map::new();
    caps.insert(
        "goog:chromeOptions".to_string(),
        json!({
            "prefs": {
                "profile.default_content_setting_values.notifications": 2
            }
        }),
    );
    caps
}

#[async_trait]
impl Renderer for WebDriverRenderer {
    async fn render(&self, url: &str) -> Result<String, RenderError> {
        self.client.goto(url).await?;

        // Soft wait: a page that never settles is read as-is
        if let Err(e) = self
            .client
            .wait()
            .at_most(self.page_wait)
            .for_element(Locator::Css("body"))
            .await
        {
            tracing::debug!("Page wait elapsed for {}: {}", url, e);
        }

        Ok(self.client.source().await?)
    }

    async fn close(&self) -> Result<(), RenderError> {
        self.client.clone().close().await?;
        tracing::info!("WebDriver session closed");
        Ok(())
    }
}

/// Renderer that fetches raw markup over HTTP
pub struct HttpRenderer {
    client: reqwest::Client,
}

impl HttpRenderer {
    pub fn new(user_agent: &str) -> Result<Self, RenderError> {
        let client = build_http_client(user_agent).map_err(|source| RenderError::Http {
            url: String::new(),
            source,
        })?;
        Ok(Self { client })
    }
}

/// Builds the HTTP client used by [`HttpRenderer`]
pub fn build_http_client(user_agent: &str) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

#[async_trait]
impl Renderer for HttpRenderer {
    async fn render(&self, url: &str) -> Result<String, RenderError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| RenderError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RenderError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|source| RenderError::Http {
            url: url.to_string(),
            source,
        })
    }
}

/// Opens the renderer selected by configuration
pub async fn open_renderer(
    config: &RendererConfig,
    page_wait: Duration,
) -> Result<Box<dyn Renderer>, RenderError> {
    match config.kind {
        RendererKind::Webdriver => Ok(Box::new(
            WebDriverRenderer::connect(&config.webdriver_url, page_wait).await?,
        )),
        RendererKind::Http => Ok(Box::new(HttpRenderer::new(&config.user_agent)?)),
    }
}

#[async_trait]
impl<R: Renderer + ?Sized> Renderer for Box<R> {
    async fn render(&self, url: &str) -> Result<String, RenderError> {
        (**self).render(url).await
    }

    async fn close(&self) -> Result<(), RenderError> {
        (**self).close().await
    }
}
