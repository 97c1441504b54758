//! Category pagination state machine
//!
//! A category walk moves through the phases of [`PaginationPhase`] in order:
//!
//! 1. Initial: fetch the listing (with lazy-content scroll) and extract references
//! 2. LoadMore: click the in-place "load more" control until it stops paying off
//! 3. ButtonPagination: click "next page" / "go to page N" controls, only if
//!    load-more never clicked
//! 4. UrlSweep: fetch numbered page URLs linked from the current document
//! 5. Done: truncate to the per-category cap
//!
//! Every loop carries a hard ceiling so a broken pager cannot keep the walk
//! running forever.

use crate::config::CrawlerConfig;
use crate::crawler::document::Document;
use crate::crawler::listing::{detect_total_pages, pagination_links, ListingExtractor};
use crate::crawler::session::CrawlSession;
use crate::model::ProductReference;
use crate::state::{PaginationPhase, PaginationState};
use std::path::{Path, PathBuf};

/// Readiness selector for category listing pages
pub const LISTING_READY_SELECTOR: &str = ".product-item, .product-card, .product, .plp-card";

/// In-place content expansion controls
pub const LOAD_MORE_SELECTORS: &[&str] = &[
    ".load-more",
    ".show-more",
    "[data-action=\"load-more\"]",
    "button.more",
    ".btn-load-more",
    "#load-more",
];

/// "Next page" controls, including the component-library pager
pub const NEXT_PAGE_SELECTORS: &[&str] = &[
    "[aria-label=\"Next Page\"]",
    "[title=\"Next Page\"]",
    "button[aria-label=\"Next Page\"]",
    "button[title=\"Next Page\"]",
    ".slds-pagination_container button[aria-label=\"Next Page\"]",
    "button[aria-label*=\"Next\"]",
    "a[aria-label*=\"Next\"]",
    ".next-page",
    ".pagination-next",
];

/// Selectors for the "go to page N" control of a specific page
pub fn page_number_selectors(page: u32) -> Vec<String> {
    vec![
        format!("[aria-label=\"Go to page {}\"]", page),
        format!("button[aria-label=\"Go to page {}\"]", page),
        format!("a[aria-label=\"Go to page {}\"]", page),
    ]
}

/// Ceilings and cap applied to one category walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationLimits {
    pub load_more_ceiling: u32,
    pub max_pages: u32,
    pub empty_page_tolerance: u32,
    pub max_products: Option<usize>,
}

impl Default for PaginationLimits {
    fn default() -> Self {
        Self {
            load_more_ceiling: 50,
            max_pages: 100,
            empty_page_tolerance: 3,
            max_products: None,
        }
    }
}

impl From<&CrawlerConfig> for PaginationLimits {
    fn from(config: &CrawlerConfig) -> Self {
        Self {
            load_more_ceiling: config.load_more_ceiling,
            max_pages: config.max_pages,
            empty_page_tolerance: config.empty_page_tolerance,
            max_products: config.max_products_per_category,
        }
    }
}

/// Enumerates every product reference in a category
pub struct PaginationController {
    limits: PaginationLimits,
    listing: ListingExtractor,
    load_more_selectors: Vec<String>,
    next_page_selectors: Vec<String>,
    debug_html_dir: Option<PathBuf>,
}

impl PaginationController {
    /// Creates a controller with the given limits
    pub fn new(limits: PaginationLimits) -> Self {
        Self {
            limits,
            listing: ListingExtractor::new(),
            load_more_selectors: to_owned(LOAD_MORE_SELECTORS),
            next_page_selectors: to_owned(NEXT_PAGE_SELECTORS),
            debug_html_dir: None,
        }
    }

    /// Dumps the first listing page of each category into `dir`
    pub fn with_debug_html_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.debug_html_dir = Some(dir.into());
        self
    }

    /// The limits this controller enforces
    pub fn limits(&self) -> PaginationLimits {
        self.limits
    }

    /// Walks the category at `url` and returns its deduplicated references
    ///
    /// Fetch failures are recorded on the session; a category whose first
    /// page cannot be loaded yields no references.
    pub async fn collect(
        &self,
        session: &mut CrawlSession,
        category: &str,
        url: &str,
    ) -> Vec<ProductReference> {
        let mut state = PaginationState::new(url);

        let Some(first_page) = session
            .fetch_with_scroll(url, Some(LISTING_READY_SELECTOR))
            .await
        else {
            return Vec::new();
        };

        if let Some(dir) = &self.debug_html_dir {
            dump_debug_html(dir, &first_page);
        }

        let total_pages = detect_total_pages(&first_page);
        tracing::info!("Detected {} total pages in category", total_pages);

        let found = self.listing.extract(&first_page, category);
        let found_count = found.len();
        state.merge(found);
        tracing::info!(
            "Page {}: Found {} products (total: {})",
            state.current_page,
            found_count,
            state.collected_len()
        );

        state.advance(PaginationPhase::LoadMore);
        let load_more_clicks = self.load_more_loop(session, &mut state, category).await;

        if load_more_clicks == 0 {
            state.advance(PaginationPhase::ButtonPagination);
            self.button_loop(session, &mut state, category).await;
        } else {
            tracing::debug!(
                "Load-more clicked {} times, skipping button pagination",
                load_more_clicks
            );
        }

        state.advance(PaginationPhase::UrlSweep);
        let current = session.current_document().await.unwrap_or(first_page);
        self.url_sweep(session, &mut state, category, &current).await;

        let references = state.finish(self.limits.max_products);
        tracing::info!("Found {} product URLs in {}", references.len(), category);
        references
    }

    /// Clicks "load more" until nothing new appears; returns the click count
    async fn load_more_loop(
        &self,
        session: &mut CrawlSession,
        state: &mut PaginationState,
        category: &str,
    ) -> u32 {
        while state.load_more_attempts < self.limits.load_more_ceiling
            && !state.cap_reached(self.limits.max_products)
        {
            if !session.click(&self.load_more_selectors).await {
                break;
            }
            state.load_more_attempts += 1;

            let Some(expanded) = session.current_document().await else {
                break;
            };

            let new_count = state.merge(self.listing.extract(&expanded, category));
            tracing::info!(
                "Load more #{}: Found {} new products (total: {})",
                state.load_more_attempts,
                new_count,
                state.collected_len()
            );

            if new_count == 0 {
                break;
            }
        }

        state.load_more_attempts
    }

    /// Clicks through AJAX pages until the pager runs dry
    async fn button_loop(
        &self,
        session: &mut CrawlSession,
        state: &mut PaginationState,
        category: &str,
    ) {
        while state.current_page < self.limits.max_pages
            && state.consecutive_empty_pages < self.limits.empty_page_tolerance
        {
            if state.cap_reached(self.limits.max_products) {
                tracing::info!(
                    "Reached max products limit ({})",
                    state.collected_len()
                );
                break;
            }

            session.scroll_to_bottom().await;

            let mut clicked = session.click(&self.next_page_selectors).await;
            if !clicked {
                clicked = session
                    .click(&page_number_selectors(state.current_page + 1))
                    .await;
            }
            if !clicked {
                tracing::info!("No more pagination buttons found");
                break;
            }

            state.current_page += 1;

            let Some(page) = session.current_document().await else {
                break;
            };

            let new_count = state.merge(self.listing.extract(&page, category));
            state.record_page_gain(new_count);
            tracing::info!(
                "Page {}: Found {} new products (total: {})",
                state.current_page,
                new_count,
                state.collected_len()
            );
        }

        if state.consecutive_empty_pages >= self.limits.empty_page_tolerance {
            tracing::debug!(
                "Stopped button pagination after {} empty pages",
                state.consecutive_empty_pages
            );
        }
    }

    /// Fetches numbered page URLs linked from `current`
    async fn url_sweep(
        &self,
        session: &mut CrawlSession,
        state: &mut PaginationState,
        category: &str,
        current: &Document,
    ) {
        for link in pagination_links(current) {
            if state.visited_page_urls.contains(&link) || session.is_visited(&link) {
                continue;
            }
            if state.cap_reached(self.limits.max_products) {
                break;
            }

            state.visited_page_urls.insert(link.clone());

            let Some(page) = session
                .fetch_with_scroll(&link, Some(LISTING_READY_SELECTOR))
                .await
            else {
                continue;
            };

            let new_count = state.merge(self.listing.extract(&page, category));
            tracing::info!(
                "Pagination URL: Found {} new products (total: {})",
                new_count,
                state.collected_len()
            );
        }
    }
}

/// File name for a debug dump of `url`
///
/// The scheme is stripped, slashes become underscores and the result is
/// cut to 50 characters.
pub fn debug_file_name(url: &str) -> String {
    let stripped = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    let stem: String = stripped.replace('/', "_").chars().take(50).collect();
    format!("debug_page_{}.html", stem)
}

fn dump_debug_html(dir: &Path, document: &Document) {
    let path = dir.join(debug_file_name(document.url().as_str()));
    let written = std::fs::create_dir_all(dir).and_then(|_| std::fs::write(&path, document.source()));
    match written {
        Ok(()) => tracing::info!("Saved debug HTML to {}", path.display()),
        Err(e) => tracing::warn!("Could not save debug HTML to {}: {}", path.display(), e),
    }
}

fn to_owned(selectors: &[&str]) -> Vec<String> {
    selectors.iter().map(|s| s.to_string()).collect()
}
