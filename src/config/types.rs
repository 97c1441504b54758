use serde::Deserialize;
use std::collections::BTreeMap;

/// Main configuration structure for Catalog-Sweep
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub site: SiteConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Fixed delay applied before every page fetch (milliseconds)
    pub delay_ms: u64,

    /// Upper bound on product references collected per category
    pub max_products_per_category: Option<usize>,

    /// Timeout for a single page load (seconds)
    pub page_load_timeout_secs: u64,

    /// Timeout for readiness selectors and clickable controls (seconds)
    pub wait_timeout_secs: u64,

    /// Maximum load-more clicks per category
    pub load_more_ceiling: u32,

    /// Maximum listing pages walked by button pagination
    pub max_pages: u32,

    /// Consecutive pages without new references before button pagination stops
    pub empty_page_tolerance: u32,

    /// Scroll passes used to trigger lazy-loaded listing content
    pub max_scrolls: u32,

    /// Run the browser without a visible window
    pub headless: bool,

    /// Category slugs (or fragments of them) to crawl; empty means all
    pub categories: Vec<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            delay_ms: 2000,
            max_products_per_category: None,
            page_load_timeout_secs: 30,
            wait_timeout_secs: 10,
            load_more_ceiling: 50,
            max_pages: 100,
            empty_page_tolerance: 3,
            max_scrolls: 5,
            headless: true,
            categories: Vec::new(),
        }
    }
}

/// Target catalog site configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SiteConfig {
    /// Root URL that relative links are resolved against
    pub base_url: String,

    /// Path of the page listing all top-level categories
    pub parts_path: String,

    /// User agent presented to the site
    pub user_agent: String,

    /// Fallback category table (slug -> path or URL)
    pub categories: BTreeMap<String, String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.fleetpride.com".to_string(),
            parts_path: "/parts".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
            categories: known_categories(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Path of the JSON report; the CSV companion shares its stem
    pub json_path: String,

    /// Directory receiving the raw HTML of each category's first listing page
    pub debug_html_dir: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            json_path: "fleetpride_products.json".to_string(),
            debug_html_dir: None,
        }
    }
}

/// Category slugs known to exist on the default catalog site
pub fn known_categories() -> BTreeMap<String, String> {
    [
        ("brakes", "/parts/brakes-wheel-end"),
        ("filters", "/parts/lubrication-filtration"),
        ("lighting", "/parts/lighting"),
        ("electrical", "/parts/starters-alternators-electrical"),
        ("exhaust", "/parts/exhaust"),
        ("cooling", "/parts/cooling-system"),
        ("suspension", "/parts/suspension-steering"),
        ("engine", "/parts/engine"),
        ("drivetrain", "/parts/drive-train"),
        ("trailer", "/parts/trailer"),
        ("hvac", "/parts/air-conditioning-heating"),
        ("air-system", "/parts/air-system"),
        ("fuel", "/parts/fuel-systems"),
        ("body", "/parts/body"),
        ("cab", "/parts/cab-chrome"),
        ("tools", "/parts/tools-safety-supplies"),
    ]
    .into_iter()
    .map(|(slug, path)| (slug.to_string(), path.to_string()))
    .collect()
}
