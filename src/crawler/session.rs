//! Run-scoped page access
//!
//! A `CrawlSession` owns the fetcher together with the state every page load
//! must respect: the rate limiter, the set of URLs already fetched in this
//! run, and the error records collected along the way.

use crate::config::CrawlerConfig;
use crate::crawler::document::Document;
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::rate_limit::RateLimiter;
use crate::model::ErrorRecord;
use crate::state::VisitedSet;
use std::time::Duration;

/// Fetch wrapper shared by discovery, pagination and product scraping
pub struct CrawlSession {
    fetcher: Box<dyn PageFetcher>,
    limiter: RateLimiter,
    visited: VisitedSet,
    errors: Vec<ErrorRecord>,
    page_timeout: Duration,
    max_scrolls: u32,
}

impl CrawlSession {
    /// Creates a session around `fetcher` using the crawler settings
    pub fn new(fetcher: Box<dyn PageFetcher>, config: &CrawlerConfig) -> Self {
        Self {
            fetcher,
            limiter: RateLimiter::from_millis(config.delay_ms),
            visited: VisitedSet::new(),
            errors: Vec::new(),
            page_timeout: Duration::from_secs(config.page_load_timeout_secs),
            max_scrolls: config.max_scrolls,
        }
    }

    /// Fetches `url` unless it was already fetched in this run
    ///
    /// Returns None when the URL was seen before or the load failed; load
    /// failures are recorded as error records.
    pub async fn fetch(&mut self, url: &str, ready_selector: Option<&str>) -> Option<Document> {
        if !self.visited.mark_if_new(url) {
            tracing::debug!("Skipping already visited: {}", url);
            return None;
        }

        self.limiter.wait().await;

        match self
            .fetcher
            .load(url, ready_selector, self.page_timeout)
            .await
        {
            Ok(document) => Some(document),
            Err(e) => {
                tracing::error!("Failed to load {}: {}", url, e);
                self.record_error(url, format!("Failed to load page: {}", e));
                None
            }
        }
    }

    /// Fetches `url` and scrolls it to trigger lazy-loaded content
    ///
    /// The returned document reflects the page after scrolling. If the
    /// post-scroll snapshot cannot be taken, the initial load is returned.
    pub async fn fetch_with_scroll(
        &mut self,
        url: &str,
        ready_selector: Option<&str>,
    ) -> Option<Document> {
        let loaded = self.fetch(url, ready_selector).await?;

        if let Err(e) = self.fetcher.scroll_to_bottom(self.max_scrolls).await {
            tracing::debug!("Scroll failed on {}: {}", url, e);
            return Some(loaded);
        }

        match self.fetcher.current_document().await {
            Ok(document) => Some(document),
            Err(e) => {
                tracing::debug!("Could not snapshot {} after scrolling: {}", url, e);
                Some(loaded)
            }
        }
    }

    /// Clicks the first clickable element matching any selector
    pub async fn click(&mut self, selectors: &[String]) -> bool {
        self.fetcher.click_first_matching(selectors).await
    }

    /// Scrolls the live page to the bottom, ignoring failures
    pub async fn scroll_to_bottom(&mut self) {
        if let Err(e) = self.fetcher.scroll_to_bottom(1).await {
            tracing::debug!("Could not scroll to bottom: {}", e);
        }
    }

    /// The live page, if the fetcher can provide it
    pub async fn current_document(&mut self) -> Option<Document> {
        match self.fetcher.current_document().await {
            Ok(document) => Some(document),
            Err(e) => {
                tracing::debug!("No current document: {}", e);
                None
            }
        }
    }

    /// Returns true if `url` was already fetched in this run
    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// Number of distinct URLs fetched (or attempted) so far
    pub fn fetched_count(&self) -> usize {
        self.visited.len()
    }

    /// Appends an error record for `url`
    pub fn record_error(&mut self, url: &str, error: impl ToString) {
        self.errors.push(ErrorRecord::new(url, error));
    }

    /// Error records collected so far
    pub fn errors(&self) -> &[ErrorRecord] {
        &self.errors
    }

    /// Takes the collected error records, leaving the session's list empty
    pub fn take_errors(&mut self) -> Vec<ErrorRecord> {
        std::mem::take(&mut self.errors)
    }

    /// Releases the fetcher's resources
    pub async fn close(&mut self) {
        if let Err(e) = self.fetcher.close().await {
            tracing::warn!("Error closing fetcher: {}", e);
        }
    }
}
