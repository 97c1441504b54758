//! Crawler module for catalog page fetching and traversal
//!
//! This module contains the core crawling logic, including:
//! - Page fetching behind the [`PageFetcher`] seam (plain HTTP or Chrome)
//! - Parsed page access and listing link extraction
//! - Category discovery and pagination walking
//! - Overall crawl coordination

#[cfg(feature = "browser")]
mod browser;
mod coordinator;
mod discover;
pub mod document;
mod fetcher;
pub mod listing;
pub mod pagination;
mod rate_limit;
mod session;

#[cfg(feature = "browser")]
pub use browser::ChromeFetcher;
pub use coordinator::{run_crawl, Coordinator, PRODUCT_READY_SELECTOR};
pub use discover::{categories_from_index, discover_categories, known_category_urls};
pub use document::Document;
pub use fetcher::{build_http_client, HttpFetcher, PageFetcher};
pub use listing::ListingExtractor;
pub use pagination::{PaginationController, PaginationLimits};
pub use rate_limit::RateLimiter;
pub use session::CrawlSession;
