//! Crawler coordinator - top-level crawl orchestration
//!
//! This module sequences a whole run:
//! - Discovering categories (or falling back to the known table)
//! - Applying the user's category filters
//! - Walking each category's listings through the pagination controller
//! - Extracting every referenced product page
//! - Producing the final report
//!
//! Nothing tied to a single page or product aborts the run. Failures become
//! error records in the report.

use crate::config::Config;
use crate::crawler::discover::discover_categories;
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::pagination::{PaginationController, PaginationLimits};
use crate::crawler::session::CrawlSession;
use crate::extract::FieldExtractor;
use crate::model::{Product, ProductReference};
use crate::output::{write_outputs, CrawlReport, OutputPaths};
use crate::state::VisitedSet;
use crate::url::select_categories;
use crate::Result;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;

/// Readiness selector for product pages
pub const PRODUCT_READY_SELECTOR: &str = ".product-name, .product-title, h1, [itemprop=\"name\"]";

/// Main crawler coordinator structure
///
/// All run-scoped state lives here: the fetch session (with its visited
/// pages and error records), the product references already collected in
/// earlier categories, and the products extracted so far.
pub struct Coordinator {
    config: Config,
    session: CrawlSession,
    pagination: PaginationController,
    extractor: FieldExtractor,
    collected: VisitedSet,
    products: Vec<Product>,
}

impl Coordinator {
    /// Creates a coordinator driving `fetcher` with the given configuration
    pub fn new(config: Config, fetcher: Box<dyn PageFetcher>) -> Self {
        let session = CrawlSession::new(fetcher, &config.crawler);

        let mut pagination = PaginationController::new(PaginationLimits::from(&config.crawler));
        if let Some(dir) = &config.output.debug_html_dir {
            pagination = pagination.with_debug_html_dir(dir);
        }

        Self {
            config,
            session,
            pagination,
            extractor: FieldExtractor::new(),
            collected: VisitedSet::new(),
            products: Vec::new(),
        }
    }

    /// Runs the crawl over every selected category
    ///
    /// Returns the report; writing it is left to the caller.
    pub async fn run(&mut self) -> Result<CrawlReport> {
        tracing::info!("Starting catalog sweep of {}", self.config.site.base_url);
        let start_time = std::time::Instant::now();

        let all_categories = discover_categories(&mut self.session, &self.config.site).await;
        let selected = select_categories(&all_categories, &self.config.crawler.categories);

        if selected.is_empty() {
            tracing::error!("No valid categories to scrape!");
        } else {
            tracing::info!(
                "Will scrape {} categories: {:?}",
                selected.len(),
                selected.keys().collect::<Vec<_>>()
            );
        }

        for (category, url) in &selected {
            let added = self.scrape_category(category, url).await;
            tracing::info!(
                "Category {} yielded {} products (total so far: {})",
                category,
                added,
                self.products.len()
            );
        }

        self.session.close().await;

        tracing::info!(
            "Crawl completed: {} products, {} pages fetched in {:?}",
            self.products.len(),
            self.session.fetched_count(),
            start_time.elapsed()
        );

        Ok(CrawlReport::new(
            std::mem::take(&mut self.products),
            self.session.take_errors(),
        ))
    }

    /// Collects a category's references and extracts each product
    ///
    /// Returns the number of products added.
    pub async fn scrape_category(&mut self, category: &str, url: &str) -> usize {
        tracing::info!("=== Scraping category: {} ===", category);

        let references = self.pagination.collect(&mut self.session, category, url).await;
        let total = references.len();
        let before = self.products.len();

        for (index, reference) in references.iter().enumerate() {
            if !self.collected.mark_if_new(&reference.url) {
                tracing::debug!("Product already collected: {}", reference.url);
                continue;
            }

            tracing::info!("Processing product {}/{}", index + 1, total);
            if let Some(product) = self.scrape_product(reference).await {
                self.products.push(product);
            }
        }

        self.products.len() - before
    }

    /// Fetches and extracts one product page
    ///
    /// A panic inside extraction is caught and recorded against the URL.
    async fn scrape_product(&mut self, reference: &ProductReference) -> Option<Product> {
        tracing::debug!("Scraping product: {}", reference.url);

        let document = self
            .session
            .fetch(&reference.url, Some(PRODUCT_READY_SELECTOR))
            .await?;

        let extractor = &self.extractor;
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            extractor.extract(&document, &reference.url, &reference.category, None)
        }));

        match outcome {
            Ok(product) => Some(product),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!("Error parsing product {}: {}", reference.url, message);
                self.session.record_error(&reference.url, message);
                None
            }
        }
    }

    /// Products extracted so far
    pub fn products(&self) -> &[Product] {
        &self.products
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unexpected failure during extraction".to_string()
    }
}

/// Runs a complete crawl and writes its outputs
///
/// This is the main entry point for a crawl. It will:
/// 1. Discover and select categories
/// 2. Walk every category's pagination
/// 3. Extract each product page
/// 4. Write the JSON report and the CSV companion
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `fetcher` - The page fetcher to drive
///
/// # Returns
///
/// * `Ok((CrawlReport, OutputPaths))` - The report and where it was written
/// * `Err(SweepError)` - The outputs could not be written
///
/// # Example
///
/// ```no_run
/// use catalog_sweep::config::Config;
/// use catalog_sweep::crawler::{run_crawl, HttpFetcher};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config::default();
/// let fetcher = HttpFetcher::new(&config.site)?;
/// let (report, paths) = run_crawl(config, Box::new(fetcher)).await?;
/// println!("{} products written to {}", report.total_products, paths.json.display());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    config: Config,
    fetcher: Box<dyn PageFetcher>,
) -> Result<(CrawlReport, OutputPaths)> {
    let json_path = config.output.json_path.clone();

    let mut coordinator = Coordinator::new(config, fetcher);
    let report = coordinator.run().await?;
    let paths = write_outputs(&report, Path::new(&json_path))?;

    Ok((report, paths))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message_from_str_and_string() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");

        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");

        let payload: Box<dyn Any + Send> = Box::new(7_u32);
        assert_eq!(
            panic_message(payload.as_ref()),
            "unexpected failure during extraction"
        );
    }
}
