//! Headless Chrome page fetcher
//!
//! Drives a real browser so listings that render client-side, expand in
//! place or paginate over AJAX can be walked. Pagination controls on the
//! target are rendered inside shadow roots, so clicks first go through a
//! script that searches shadow trees before falling back to native element
//! queries.

use crate::config::{CrawlerConfig, SiteConfig};
use crate::crawler::document::Document;
use crate::crawler::fetcher::PageFetcher;
use crate::{FetchError, FetchResult};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::emulation::SetUserAgentOverrideParams;
use chromiumoxide::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use url::Url;

/// Launch flags that keep automation markers out of the page
const LAUNCH_ARGS: &[&str] = &[
    "--disable-blink-features=AutomationControlled",
    "--disable-dev-shm-usage",
    "--no-sandbox",
    "--disable-gpu",
    "--disable-extensions",
    "--disable-infobars",
    "--lang=en-US",
];

/// Hides `navigator.webdriver` on every new document
const STEALTH_SCRIPT: &str =
    "Object.defineProperty(navigator, 'webdriver', { get: () => undefined });";

/// Searches the document and every shadow root for the first usable match
/// of the selectors in `__SELECTORS__` and clicks it
const DEEP_CLICK_SCRIPT: &str = r#"
(() => {
    const selectors = __SELECTORS__;
    const deepQuery = (selector, root) => {
        const found = [];
        const visit = (node) => {
            if (node.nodeType === Node.ELEMENT_NODE) {
                if (node.matches && node.matches(selector)) found.push(node);
                if (node.shadowRoot) visit(node.shadowRoot);
            }
            node.childNodes.forEach(visit);
        };
        visit(root);
        return found;
    };
    const usable = (el) => el
        && !el.disabled
        && el.getAttribute('aria-disabled') !== 'true'
        && !String(el.className || '').toLowerCase().includes('disabled')
        && el.offsetParent !== null;
    for (const selector of selectors) {
        let candidates = [];
        try {
            candidates = Array.from(document.querySelectorAll(selector));
            if (candidates.length === 0) candidates = deepQuery(selector, document);
        } catch (e) {
            continue;
        }
        const target = candidates.find(usable);
        if (target) {
            target.scrollIntoView({ block: 'center' });
            target.click();
            return true;
        }
    }
    return false;
})()
"#;

const POLL_INTERVAL: Duration = Duration::from_millis(250);
const SCROLL_PAUSE: Duration = Duration::from_millis(500);
const CLICK_SETTLE: Duration = Duration::from_secs(2);

/// Page fetcher backed by a headless (or headed) Chrome instance
pub struct ChromeFetcher {
    browser: Browser,
    handler: JoinHandle<()>,
    page: Page,
    wait_timeout: Duration,
}

impl ChromeFetcher {
    /// Launches Chrome and opens the single working tab
    pub async fn launch(crawler: &CrawlerConfig, site: &SiteConfig) -> FetchResult<Self> {
        let mut builder = BrowserConfig::builder()
            .window_size(1920, 1080)
            .request_timeout(Duration::from_secs(crawler.page_load_timeout_secs))
            .args(LAUNCH_ARGS.iter().copied());
        if !crawler.headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(FetchError::Browser)?;

        let (browser, mut events) = Browser::launch(config).await.map_err(browser_error)?;
        let handler = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if let Err(e) = event {
                    tracing::trace!("Browser handler event error: {}", e);
                }
            }
        });

        let page = browser.new_page("about:blank").await.map_err(browser_error)?;
        page.set_user_agent(SetUserAgentOverrideParams::new(site.user_agent.clone()))
            .await
            .map_err(browser_error)?;
        page.evaluate_on_new_document(STEALTH_SCRIPT)
            .await
            .map_err(browser_error)?;

        tracing::info!("Chrome started (headless: {})", crawler.headless);

        Ok(Self {
            browser,
            handler,
            page,
            wait_timeout: Duration::from_secs(crawler.wait_timeout_secs),
        })
    }

    async fn evaluate<T: serde::de::DeserializeOwned>(&self, script: &str) -> FetchResult<T> {
        self.page
            .evaluate(script)
            .await
            .map_err(browser_error)?
            .into_value()
            .map_err(|e| FetchError::Browser(e.to_string()))
    }

    async fn wait_for_selector(&self, selector: &str) -> bool {
        let deadline = tokio::time::Instant::now() + self.wait_timeout;
        while tokio::time::Instant::now() < deadline {
            if self.page.find_element(selector).await.is_ok() {
                return true;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
        false
    }

    async fn wait_for_ready_state(&self) {
        let deadline = tokio::time::Instant::now() + self.wait_timeout;
        while tokio::time::Instant::now() < deadline {
            match self.evaluate::<String>("document.readyState").await {
                Ok(state) if state == "complete" => return,
                _ => tokio::time::sleep(POLL_INTERVAL).await,
            }
        }
    }

    async fn click_native(&self, selectors: &[String]) -> bool {
        for selector in selectors {
            let Ok(elements) = self.page.find_elements(selector.as_str()).await else {
                continue;
            };
            tracing::debug!("Found {} elements for selector: {}", elements.len(), selector);

            for element in elements {
                let disabled = element.attribute("disabled").await.ok().flatten().is_some();
                let aria_disabled = element.attribute("aria-disabled").await.ok().flatten();
                let class = element
                    .attribute("class")
                    .await
                    .ok()
                    .flatten()
                    .unwrap_or_default();
                if disabled
                    || aria_disabled.as_deref() == Some("true")
                    || class.to_lowercase().contains("disabled")
                {
                    continue;
                }

                if let Err(e) = element.scroll_into_view().await {
                    tracing::debug!("Could not scroll {} into view: {}", selector, e);
                }
                match element.click().await {
                    Ok(_) => {
                        tracing::info!("Clicked element: {}", selector);
                        return true;
                    }
                    Err(e) => tracing::debug!("Element interaction error: {}", e),
                }
            }
        }
        false
    }
}

#[async_trait(?Send)]
impl PageFetcher for ChromeFetcher {
    async fn load(
        &mut self,
        url: &str,
        ready_selector: Option<&str>,
        timeout: Duration,
    ) -> FetchResult<Document> {
        tracing::info!("Loading: {}", url);

        match tokio::time::timeout(timeout, self.page.goto(url)).await {
            Err(_) => {
                return Err(FetchError::Timeout {
                    url: url.to_string(),
                })
            }
            Ok(Err(e)) => {
                return Err(FetchError::Network {
                    url: url.to_string(),
                    message: e.to_string(),
                })
            }
            Ok(Ok(_)) => {}
        }

        if let Some(selector) = ready_selector {
            if !self.wait_for_selector(selector).await {
                tracing::warn!("Timeout waiting for selector: {}", selector);
            }
        }
        self.wait_for_ready_state().await;

        self.current_document().await
    }

    async fn scroll_to_bottom(&mut self, max_scrolls: u32) -> FetchResult<()> {
        let mut last_height: i64 = self.evaluate("document.body.scrollHeight").await?;

        for _ in 0..max_scrolls {
            self.evaluate::<bool>("window.scrollTo(0, document.body.scrollHeight); true")
                .await?;
            tokio::time::sleep(SCROLL_PAUSE).await;

            let height: i64 = self.evaluate("document.body.scrollHeight").await?;
            if height == last_height {
                break;
            }
            last_height = height;
        }
        Ok(())
    }

    async fn click_first_matching(&mut self, selectors: &[String]) -> bool {
        let selector_list = match serde_json::to_string(selectors) {
            Ok(list) => list,
            Err(e) => {
                tracing::debug!("Could not encode selectors: {}", e);
                return false;
            }
        };
        let script = DEEP_CLICK_SCRIPT.replace("__SELECTORS__", &selector_list);

        let clicked = match self.evaluate::<bool>(&script).await {
            Ok(true) => {
                tracing::info!("Clicked control via page script");
                true
            }
            Ok(false) => self.click_native(selectors).await,
            Err(e) => {
                tracing::debug!("JavaScript click failed: {}", e);
                self.click_native(selectors).await
            }
        };

        if clicked {
            tokio::time::sleep(CLICK_SETTLE).await;
        }
        clicked
    }

    async fn run_script(&mut self, script: &str) -> FetchResult<serde_json::Value> {
        self.evaluate(script).await
    }

    async fn current_document(&mut self) -> FetchResult<Document> {
        let html = self.page.content().await.map_err(browser_error)?;
        let url = self
            .page
            .url()
            .await
            .map_err(browser_error)?
            .and_then(|u| Url::parse(&u).ok())
            .ok_or_else(|| FetchError::Browser("page has no URL".to_string()))?;

        Ok(Document::parse(url, &html))
    }

    async fn close(&mut self) -> FetchResult<()> {
        self.browser.close().await.map_err(browser_error)?;
        if let Err(e) = self.browser.wait().await {
            tracing::debug!("Browser exit wait failed: {}", e);
        }
        self.handler.abort();
        tracing::info!("Chrome stopped");
        Ok(())
    }
}

fn browser_error(error: chromiumoxide::error::CdpError) -> FetchError {
    FetchError::Browser(error.to_string())
}
