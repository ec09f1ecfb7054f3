use serde::Deserialize;

/// Main configuration structure for Meli-Leads
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub renderer: RendererConfig,
    #[serde(default)]
    pub seeds: SeedsConfig,
    pub warehouse: WarehouseConfig,
}

/// Crawl pacing and pagination configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Listing root; seeds are appended as `<city>/<category>`
    #[serde(rename = "root-url", default = "default_root_url")]
    pub root_url: String,

    /// Page budget per seed (a walk fetches at most `max-pages + 1` pages)
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,

    /// Courtesy pause before every page request (milliseconds)
    #[serde(rename = "pre-request-pause-ms", default = "default_pre_request_pause_ms")]
    pub pre_request_pause_ms: u64,

    /// Attempts per page before a fetch is considered failed
    #[serde(rename = "retry-attempts", default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Fixed cooldown between failed attempts (milliseconds)
    #[serde(rename = "retry-cooldown-ms", default = "default_retry_cooldown_ms")]
    pub retry_cooldown_ms: u64,

    /// Soft wait for a rendered page to settle (milliseconds)
    #[serde(rename = "page-wait-ms", default = "default_page_wait_ms")]
    pub page_wait_ms: u64,

    /// Skip records whose vendor is already in the warehouse
    #[serde(rename = "skip-known-vendors", default = "default_true")]
    pub skip_known_vendors: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            root_url: default_root_url(),
            max_pages: default_max_pages(),
            pre_request_pause_ms: default_pre_request_pause_ms(),
            retry_attempts: default_retry_attempts(),
            retry_cooldown_ms: default_retry_cooldown_ms(),
            page_wait_ms: default_page_wait_ms(),
            skip_known_vendors: true,
        }
    }
}

/// Which rendering backend loads pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    /// A WebDriver-controlled browser session
    Webdriver,
    /// Plain HTTP GET, no script execution
    Http,
}

/// Rendering collaborator configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RendererConfig {
    #[serde(default = "default_renderer_kind")]
    pub kind: RendererKind,

    /// WebDriver endpoint (ChromeDriver, geckodriver, Selenium)
    #[serde(rename = "webdriver-url", default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// User agent sent by the HTTP renderer
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            kind: default_renderer_kind(),
            webdriver_url: default_webdriver_url(),
            user_agent: default_user_agent(),
        }
    }
}

/// Seed source configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SeedsConfig {
    /// CSV file with `city,category` columns
    #[serde(default = "default_seeds_path")]
    pub path: String,
}

impl Default for SeedsConfig {
    fn default() -> Self {
        Self {
            path: default_seeds_path(),
        }
    }
}

/// Warehouse configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WarehouseConfig {
    /// Path to the SQLite warehouse file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Country code templated into table names (e.g. `BR`)
    #[serde(default = "default_country")]
    pub country: String,

    #[serde(default)]
    pub account: Option<String>,

    #[serde(default)]
    pub role: Option<String>,

    #[serde(default)]
    pub warehouse: Option<String>,

    #[serde(default)]
    pub database: Option<String>,
}

impl WarehouseConfig {
    /// Opaque connection labels that were set, in display order
    pub fn labels(&self) -> Vec<(&'static str, &str)> {
        [
            ("Account", &self.account),
            ("Role", &self.role),
            ("Warehouse", &self.warehouse),
            ("Database", &self.database),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_deref().map(|v| (name, v)))
        .collect()
    }
}

fn default_root_url() -> String {
    "https://lista.mercadolivre.com.br/".to_string()
}

fn default_max_pages() -> u32 {
    2
}

fn default_pre_request_pause_ms() -> u64 {
    1_500
}

fn default_retry_attempts() -> u32 {
    10
}

fn default_retry_cooldown_ms() -> u64 {
    10_000
}

fn default_page_wait_ms() -> u64 {
    4_000
}

fn default_true() -> bool {
    true
}

fn default_renderer_kind() -> RendererKind {
    RendererKind::Webdriver
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_user_agent() -> String {
    format!("meli-leads/{}", env!("CARGO_PKG_VERSION"))
}

fn default_seeds_path() -> String {
    "categories.csv".to_string()
}

fn default_country() -> String {
    "BR".to_string()
}
