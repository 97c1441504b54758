//! Category discovery
//!
//! Reads the catalog's parts index and builds the category map from its
//! navigation links. Falls back to the configured category table when the
//! index cannot be loaded or yields nothing.

use crate::config::SiteConfig;
use crate::crawler::document::{attr, element_text, Document};
use crate::crawler::session::CrawlSession;
use crate::model::CategoryMap;
use crate::url::{resolve_link, slugify, PRODUCT_PATH_MARKER};
use url::Url;

/// Navigation areas that may list top-level categories
pub const CATEGORY_NAV_SELECTORS: &[&str] = &[
    "nav a[href*=\"/parts/\"]",
    ".category-list a",
    ".categories a",
    "a[href*=\"/category/\"]",
    ".nav-categories a",
    "[data-category] a",
    ".mega-menu a[href*=\"/parts/\"]",
    ".dropdown-menu a[href*=\"/parts/\"]",
    "aside a[href*=\"/parts/\"]",
    ".sidebar a[href*=\"/parts/\"]",
];

/// Discovers categories from the site's parts index
pub async fn discover_categories(session: &mut CrawlSession, site: &SiteConfig) -> CategoryMap {
    tracing::info!("Discovering categories...");

    let index_url = match Url::parse(&site.base_url).and_then(|base| base.join(&site.parts_path)) {
        Ok(url) => url.to_string(),
        Err(e) => {
            tracing::warn!("Invalid parts index URL ({}), using known categories", e);
            return known_category_urls(site);
        }
    };

    let Some(index) = session.fetch(&index_url, None).await else {
        tracing::warn!("Could not fetch main parts page, using known categories");
        return known_category_urls(site);
    };

    let categories = categories_from_index(&index);
    if categories.is_empty() {
        tracing::warn!("No categories discovered, using known categories");
        return known_category_urls(site);
    }

    tracing::info!("Discovered {} categories", categories.len());
    categories
}

/// Category links found in the navigation of a parts index page
///
/// Later selector families overwrite earlier ones for the same slug.
pub fn categories_from_index(index: &Document) -> CategoryMap {
    let mut categories = CategoryMap::new();

    for selector in CATEGORY_NAV_SELECTORS {
        for link in index.select_all(selector) {
            let Some(href) = attr(&link, "href") else {
                continue;
            };
            let name = element_text(&link);
            if name.is_empty() || !href.contains(PRODUCT_PATH_MARKER) {
                continue;
            }
            if let Some(url) = resolve_link(href, index.url()) {
                categories.insert(slugify(&name), url);
            }
        }
    }

    categories
}

/// The configured category table with paths resolved against the base URL
pub fn known_category_urls(site: &SiteConfig) -> CategoryMap {
    let base = match Url::parse(&site.base_url) {
        Ok(base) => base,
        Err(e) => {
            tracing::error!("Invalid base URL {}: {}", site.base_url, e);
            return CategoryMap::new();
        }
    };

    site.categories
        .iter()
        .filter_map(|(slug, path)| resolve_link(path, &base).map(|url| (slug.clone(), url)))
        .collect()
}
