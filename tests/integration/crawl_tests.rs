//! Integration tests for the crawler
//!
//! Most tests drive the crawl core through a scripted in-memory fetcher so
//! the pagination state machine runs deterministically. The last test runs
//! the whole pipeline against a wiremock server with the HTTP fetcher.

use async_trait::async_trait;
use catalog_sweep::config::{Config, CrawlerConfig, OutputConfig, SiteConfig};
use catalog_sweep::crawler::{
    run_crawl, Coordinator, CrawlSession, Document, HttpFetcher, PageFetcher, PaginationController,
    PaginationLimits,
};
use catalog_sweep::model::UNKNOWN_PART_NUMBER;
use catalog_sweep::{FetchError, FetchResult};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BASE: &str = "https://shop.example.com";
const CATEGORY_URL: &str = "https://shop.example.com/parts/brakes";

/// What the scripted fetcher was asked to do
#[derive(Debug, Default)]
struct FetchLog {
    loads: Vec<String>,
    load_more_clicks: u32,
    next_page_clicks: u32,
}

/// Serves pages from a fixed table
///
/// A "load more" click swaps in the next queued body while the queue lasts.
/// "Next Page" clicks succeed when `next_page_always_clicks` is set, but
/// leave the live page unchanged.
struct ScriptedFetcher {
    pages: HashMap<String, String>,
    load_more_pages: VecDeque<String>,
    next_page_always_clicks: bool,
    current: Option<(Url, String)>,
    log: Rc<RefCell<FetchLog>>,
}

impl ScriptedFetcher {
    fn new(pages: &[(&str, String)]) -> (Self, Rc<RefCell<FetchLog>>) {
        let log = Rc::new(RefCell::new(FetchLog::default()));
        let fetcher = Self {
            pages: pages
                .iter()
                .map(|(url, body)| (url.to_string(), body.clone()))
                .collect(),
            load_more_pages: VecDeque::new(),
            next_page_always_clicks: false,
            current: None,
            log: Rc::clone(&log),
        };
        (fetcher, log)
    }
}

#[async_trait(?Send)]
impl PageFetcher for ScriptedFetcher {
    async fn load(
        &mut self,
        url: &str,
        _ready_selector: Option<&str>,
        _timeout: Duration,
    ) -> FetchResult<Document> {
        self.log.borrow_mut().loads.push(url.to_string());

        let body = self.pages.get(url).cloned().ok_or(FetchError::Timeout {
            url: url.to_string(),
        })?;
        let parsed = Url::parse(url).map_err(|e| FetchError::Network {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        self.current = Some((parsed.clone(), body.clone()));
        Ok(Document::parse(parsed, &body))
    }

    async fn scroll_to_bottom(&mut self, _max_scrolls: u32) -> FetchResult<()> {
        Ok(())
    }

    async fn click_first_matching(&mut self, selectors: &[String]) -> bool {
        if selectors.iter().any(|s| s == ".load-more") {
            let Some((url, _)) = self.current.clone() else {
                return false;
            };
            let Some(expanded) = self.load_more_pages.pop_front() else {
                return false;
            };
            self.log.borrow_mut().load_more_clicks += 1;
            self.current = Some((url, expanded));
            return true;
        }

        let is_next_page = selectors.iter().any(|s| s.contains("Next Page"));
        if is_next_page && self.next_page_always_clicks {
            self.log.borrow_mut().next_page_clicks += 1;
            return true;
        }
        false
    }

    async fn run_script(&mut self, _script: &str) -> FetchResult<serde_json::Value> {
        Err(FetchError::Unsupported("scripts".to_string()))
    }

    async fn current_document(&mut self) -> FetchResult<Document> {
        let (url, body) = self
            .current
            .clone()
            .ok_or_else(|| FetchError::Unsupported("nothing loaded".to_string()))?;
        Ok(Document::parse(url, &body))
    }
}

/// A listing page with one card per product id and the given pager links
fn listing(ids: &[u32], pager: &[&str]) -> String {
    let cards: String = ids
        .iter()
        .map(|id| {
            format!(
                r#"<div class="product-card"><a href="/parts/pad-{id}">Pad {id}</a><span class="part-number">PAD-{id}</span></div>"#
            )
        })
        .collect();
    let links: String = pager
        .iter()
        .map(|href| format!(r#"<a href="{href}">{href}</a>"#))
        .collect();
    format!(
        r#"<html><body><div class="grid">{cards}</div><nav class="pagination">{links}</nav></body></html>"#
    )
}

fn product_page(id: u32) -> String {
    format!(
        r#"<html><body>
            <h1 class="product-name">Brake Pad {id}</h1>
            <div class="details">Part #: PAD-{id}|Brand: HDVALUE</div>
            <span class="price">$1{id}.50</span>
        </body></html>"#
    )
}

fn product_url(id: u32) -> String {
    format!("{}/parts/pad-{}", BASE, id)
}

fn index_page() -> String {
    r#"<html><body><nav><a href="/parts/brakes">Brakes</a></nav></body></html>"#.to_string()
}

fn test_config(json_path: &str) -> Config {
    Config {
        crawler: CrawlerConfig {
            delay_ms: 0,
            ..CrawlerConfig::default()
        },
        site: SiteConfig {
            base_url: BASE.to_string(),
            categories: BTreeMap::from([("brakes".to_string(), "/parts/brakes".to_string())]),
            ..SiteConfig::default()
        },
        output: OutputConfig {
            json_path: json_path.to_string(),
            debug_html_dir: None,
        },
    }
}

fn session(fetcher: ScriptedFetcher) -> CrawlSession {
    let config = CrawlerConfig {
        delay_ms: 0,
        ..CrawlerConfig::default()
    };
    CrawlSession::new(Box::new(fetcher), &config)
}

#[tokio::test]
async fn test_url_pagination_collects_union_of_pages() {
    let page2 = format!("{}?page=2", CATEGORY_URL);
    let page3 = format!("{}?page=3", CATEGORY_URL);

    let (fetcher, log) = ScriptedFetcher::new(&[
        (CATEGORY_URL, listing(&[1, 2, 3], &["?page=2", "?page=3"])),
        (page2.as_str(), listing(&[3, 4, 5], &["?page=1", "?page=3"])),
        (page3.as_str(), listing(&[5, 6], &["?page=1", "?page=2"])),
    ]);
    let mut session = session(fetcher);
    let controller = PaginationController::new(PaginationLimits::default());

    let references = controller.collect(&mut session, "brakes", CATEGORY_URL).await;

    let urls: Vec<String> = references.iter().map(|r| r.url.clone()).collect();
    assert_eq!(urls, (1..=6).map(product_url).collect::<Vec<_>>());
    assert!(references.iter().all(|r| r.category == "brakes"));
    assert_eq!(references[0].part_number_preview.as_deref(), Some("PAD-1"));

    let loads = log.borrow().loads.clone();
    assert_eq!(loads, vec![CATEGORY_URL.to_string(), page2, page3]);
}

#[tokio::test]
async fn test_button_pagination_stops_after_three_empty_pages() {
    let (mut fetcher, log) = ScriptedFetcher::new(&[(CATEGORY_URL, listing(&[1, 2], &[]))]);
    fetcher.next_page_always_clicks = true;
    let mut session = session(fetcher);
    let controller = PaginationController::new(PaginationLimits::default());

    let references = controller.collect(&mut session, "brakes", CATEGORY_URL).await;

    assert_eq!(references.len(), 2);
    assert_eq!(log.borrow().next_page_clicks, 3);
}

#[tokio::test]
async fn test_load_more_skips_button_pagination_but_still_sweeps_urls() {
    let page2 = format!("{}?page=2", CATEGORY_URL);

    let (mut fetcher, log) = ScriptedFetcher::new(&[
        (CATEGORY_URL, listing(&[1, 2], &[])),
        (page2.as_str(), listing(&[4], &[])),
    ]);
    fetcher
        .load_more_pages
        .push_back(listing(&[1, 2, 3], &["?page=2"]));
    fetcher.next_page_always_clicks = true;
    let mut session = session(fetcher);
    let controller = PaginationController::new(PaginationLimits::default());

    let references = controller.collect(&mut session, "brakes", CATEGORY_URL).await;

    let urls: Vec<String> = references.iter().map(|r| r.url.clone()).collect();
    assert_eq!(urls, (1..=4).map(product_url).collect::<Vec<_>>());

    let log = log.borrow();
    assert_eq!(log.load_more_clicks, 1);
    assert_eq!(log.next_page_clicks, 0);
    assert_eq!(log.loads, vec![CATEGORY_URL.to_string(), page2]);
}

#[tokio::test]
async fn test_button_pagination_runs_when_load_more_never_clicks() {
    let (mut fetcher, log) = ScriptedFetcher::new(&[(CATEGORY_URL, listing(&[1, 2], &[]))]);
    fetcher.next_page_always_clicks = true;
    let mut session = session(fetcher);
    let controller = PaginationController::new(PaginationLimits::default());

    controller.collect(&mut session, "brakes", CATEGORY_URL).await;

    let log = log.borrow();
    assert_eq!(log.load_more_clicks, 0);
    assert_eq!(log.next_page_clicks, 3);
}

#[tokio::test]
async fn test_button_pagination_tolerance_is_configurable() {
    let (mut fetcher, log) = ScriptedFetcher::new(&[(CATEGORY_URL, listing(&[1], &[]))]);
    fetcher.next_page_always_clicks = true;
    let mut session = session(fetcher);
    let controller = PaginationController::new(PaginationLimits {
        empty_page_tolerance: 5,
        ..PaginationLimits::default()
    });

    controller.collect(&mut session, "brakes", CATEGORY_URL).await;

    assert_eq!(log.borrow().next_page_clicks, 5);
}

#[tokio::test]
async fn test_product_cap_limits_fetches() {
    let mut pages = vec![
        (format!("{}/parts", BASE), index_page()),
        (CATEGORY_URL.to_string(), listing(&[1, 2, 3, 4, 5], &[])),
    ];
    pages.extend((1..=5).map(|id| (product_url(id), product_page(id))));
    let pages: Vec<(&str, String)> = pages.iter().map(|(u, b)| (u.as_str(), b.clone())).collect();

    let (fetcher, log) = ScriptedFetcher::new(&pages);
    let mut config = test_config("unused.json");
    config.crawler.max_products_per_category = Some(2);

    let mut coordinator = Coordinator::new(config, Box::new(fetcher));
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.total_products, 2);
    let product_loads = log
        .borrow()
        .loads
        .iter()
        .filter(|url| url.contains("/parts/pad-"))
        .count();
    assert_eq!(product_loads, 2);
}

#[tokio::test]
async fn test_products_extracted_and_never_fetched_twice() {
    // The same products are listed under two categories
    let mut pages = vec![
        (
            format!("{}/parts", BASE),
            r#"<html><body><nav>
                <a href="/parts/brakes">Brakes</a>
                <a href="/parts/wheel-end">Wheel End</a>
            </nav></body></html>"#
                .to_string(),
        ),
        (CATEGORY_URL.to_string(), listing(&[1, 2], &[])),
        (format!("{}/parts/wheel-end", BASE), listing(&[2, 3], &[])),
    ];
    pages.extend((1..=3).map(|id| (product_url(id), product_page(id))));
    let pages: Vec<(&str, String)> = pages.iter().map(|(u, b)| (u.as_str(), b.clone())).collect();

    let (fetcher, log) = ScriptedFetcher::new(&pages);
    let mut coordinator = Coordinator::new(test_config("unused.json"), Box::new(fetcher));
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.total_products, 3);
    assert_eq!(report.categories_scraped, vec!["brakes", "wheel-end"]);
    assert!(report.errors.is_empty());

    let first = &report.products[0];
    assert_eq!(first.name, "Brake Pad 1");
    assert_eq!(first.part_number, "PAD-1");
    assert_eq!(first.brand.as_deref(), Some("HDVALUE"));
    assert_eq!(first.price.as_deref(), Some("$11.50"));
    assert_eq!(first.category, "brakes");
    assert_eq!(first.url, product_url(1));

    let loads = log.borrow().loads.clone();
    let mut distinct = loads.clone();
    distinct.sort();
    distinct.dedup();
    assert_eq!(loads.len(), distinct.len());
}

#[tokio::test]
async fn test_failed_product_fetch_is_recorded_and_skipped() {
    // pad-2 is listed but has no page
    let pages = vec![
        (format!("{}/parts", BASE), index_page()),
        (CATEGORY_URL.to_string(), listing(&[1, 2, 3], &[])),
        (product_url(1), product_page(1)),
        (product_url(3), product_page(3)),
    ];
    let pages: Vec<(&str, String)> = pages.iter().map(|(u, b)| (u.as_str(), b.clone())).collect();

    let (fetcher, _log) = ScriptedFetcher::new(&pages);
    let mut coordinator = Coordinator::new(test_config("unused.json"), Box::new(fetcher));
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.total_products, 2);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].url, product_url(2));
    assert!(report.errors[0].error.contains("Failed to load page"));
}

#[tokio::test]
async fn test_unknown_category_filter_crawls_nothing() {
    let index_url = format!("{}/parts", BASE);
    let (fetcher, log) = ScriptedFetcher::new(&[(index_url.as_str(), index_page())]);
    let mut config = test_config("unused.json");
    config.crawler.categories = vec!["nonexistent".to_string()];

    let mut coordinator = Coordinator::new(config, Box::new(fetcher));
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.total_products, 0);
    assert_eq!(log.borrow().loads.len(), 1);
}

#[tokio::test]
async fn test_product_without_name_uses_defaults() {
    let pages = vec![
        (format!("{}/parts", BASE), index_page()),
        (CATEGORY_URL.to_string(), listing(&[1], &[])),
        (
            product_url(1),
            "<html><body><p>Nothing useful here</p></body></html>".to_string(),
        ),
    ];
    let pages: Vec<(&str, String)> = pages.iter().map(|(u, b)| (u.as_str(), b.clone())).collect();

    let (fetcher, _log) = ScriptedFetcher::new(&pages);
    let mut coordinator = Coordinator::new(test_config("unused.json"), Box::new(fetcher));
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.total_products, 1);
    assert_eq!(report.products[0].part_number, UNKNOWN_PART_NUMBER);
    assert!(report.errors.is_empty());
}

#[tokio::test]
async fn test_full_crawl_over_http() {
    let server = MockServer::start().await;
    let base = server.uri();

    let html = |body: String| {
        ResponseTemplate::new(200)
            .set_body_string(body)
            .insert_header("content-type", "text/html")
    };

    Mock::given(method("GET"))
        .and(path("/parts"))
        .respond_with(html(index_page()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/parts/brakes"))
        .respond_with(html(listing(&[1, 2], &[])))
        .mount(&server)
        .await;
    for id in 1..=2 {
        Mock::given(method("GET"))
            .and(path(format!("/parts/pad-{}", id)))
            .respond_with(html(product_page(id)))
            .mount(&server)
            .await;
    }

    let dir = tempfile::tempdir().unwrap();
    let json_path = dir.path().join("out").join("products.json");

    let mut config = test_config(&json_path.display().to_string());
    config.site.base_url = base.clone();

    let fetcher = HttpFetcher::new(&config.site).unwrap();
    let (report, paths) = run_crawl(config, Box::new(fetcher)).await.unwrap();

    assert_eq!(report.total_products, 2);
    assert!(report.errors.is_empty());
    assert_eq!(paths.json, json_path);

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(written["total_products"], 2);
    assert_eq!(written["categories_scraped"][0], "brakes");
    assert_eq!(written["products"][1]["part_number"], "PAD-2");
    assert_eq!(
        written["products"][1]["url"],
        format!("{}/parts/pad-2", base)
    );

    let csv_path = paths.csv.expect("CSV written when there are products");
    assert_eq!(csv_path, dir.path().join("out").join("products.csv"));
    let mut reader = csv::Reader::from_path(&csv_path).unwrap();
    assert_eq!(reader.records().count(), 2);
}
