//! Page fetching capability
//!
//! This module defines the `PageFetcher` trait the crawl core depends on,
//! and the default HTTP implementation. The HTTP fetcher:
//! - Builds a client with the configured user agent
//! - Loads pages with a per-request timeout
//! - Classifies failures as timeout, HTTP status or network errors
//! - Reports every click as unsuccessful (static HTML has no live controls)

use crate::config::SiteConfig;
use crate::crawler::document::Document;
use crate::{FetchError, FetchResult};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Capability for loading and interacting with catalog pages
///
/// Only one page is live at a time. `click_first_matching` and
/// `scroll_to_bottom` act on the most recently loaded page, and
/// `current_document` returns that page as it looks now.
#[async_trait(?Send)]
pub trait PageFetcher {
    /// Loads `url`, waiting up to `timeout` for `ready_selector` if given
    async fn load(
        &mut self,
        url: &str,
        ready_selector: Option<&str>,
        timeout: Duration,
    ) -> FetchResult<Document>;

    /// Scrolls the live page to the bottom to trigger lazy-loaded content
    async fn scroll_to_bottom(&mut self, max_scrolls: u32) -> FetchResult<()>;

    /// Clicks the first visible, enabled element matching any selector
    ///
    /// Returns true if something was clicked.
    async fn click_first_matching(&mut self, selectors: &[String]) -> bool;

    /// Evaluates a script in the live page and returns its JSON result
    async fn run_script(&mut self, script: &str) -> FetchResult<serde_json::Value>;

    /// The live page as it looks after any clicks or scrolls
    async fn current_document(&mut self) -> FetchResult<Document>;

    /// Releases any resources held by the fetcher
    async fn close(&mut self) -> FetchResult<()> {
        Ok(())
    }
}

/// Builds an HTTP client with the site's user agent
///
/// # Example
///
/// ```no_run
/// use catalog_sweep::config::SiteConfig;
/// use catalog_sweep::crawler::build_http_client;
///
/// let client = build_http_client(&SiteConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &SiteConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Plain HTTP page fetcher
///
/// Loads server-rendered HTML only. Scrolling is a no-op, clicks never
/// succeed and scripts are unsupported, so on this fetcher category walks
/// rely on URL pagination alone.
pub struct HttpFetcher {
    client: Client,
    current: Option<(Url, String)>,
}

impl HttpFetcher {
    /// Creates a fetcher using the site's user agent
    pub fn new(config: &SiteConfig) -> FetchResult<Self> {
        let client = build_http_client(config).map_err(|e| FetchError::Network {
            url: config.base_url.clone(),
            message: format!("failed to build HTTP client: {}", e),
        })?;

        Ok(Self {
            client,
            current: None,
        })
    }
}

#[async_trait(?Send)]
impl PageFetcher for HttpFetcher {
    async fn load(
        &mut self,
        url: &str,
        _ready_selector: Option<&str>,
        timeout: Duration,
    ) -> FetchResult<Document> {
        let parsed = Url::parse(url).map_err(|e| FetchError::Network {
            url: url.to_string(),
            message: format!("invalid URL: {}", e),
        })?;

        let response = self
            .client
            .get(parsed)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let body = response.text().await.map_err(|e| classify_error(url, e))?;

        let document = Document::parse(final_url.clone(), &body);
        self.current = Some((final_url, body));
        Ok(document)
    }

    async fn scroll_to_bottom(&mut self, _max_scrolls: u32) -> FetchResult<()> {
        Ok(())
    }

    async fn click_first_matching(&mut self, selectors: &[String]) -> bool {
        tracing::trace!(
            "HTTP fetcher cannot click ({} selectors offered)",
            selectors.len()
        );
        false
    }

    async fn run_script(&mut self, _script: &str) -> FetchResult<serde_json::Value> {
        Err(FetchError::Unsupported(
            "script evaluation requires the browser fetcher".to_string(),
        ))
    }

    async fn current_document(&mut self) -> FetchResult<Document> {
        match &self.current {
            Some((url, body)) => Ok(Document::parse(url.clone(), body)),
            None => Err(FetchError::Unsupported(
                "no page has been loaded yet".to_string(),
            )),
        }
    }
}

/// Maps a reqwest error onto the fetch error taxonomy
fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Network {
            url: url.to_string(),
            message: "Connection refused".to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client(&SiteConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn test_load_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/parts/brakes"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html><head><title>Brakes</title></head></html>")
                    .insert_header("content-type", "text/html"),
            )
            .mount(&server)
            .await;

        let mut fetcher = HttpFetcher::new(&SiteConfig::default()).unwrap();
        let url = format!("{}/parts/brakes", server.uri());
        let doc = fetcher
            .load(&url, None, Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(doc.title(), Some("Brakes".to_string()));

        let current = fetcher.current_document().await.unwrap();
        assert_eq!(current.url().as_str(), url);
    }

    #[tokio::test]
    async fn test_load_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let mut fetcher = HttpFetcher::new(&SiteConfig::default()).unwrap();
        let result = fetcher
            .load(&format!("{}/missing", server.uri()), None, Duration::from_secs(5))
            .await;

        assert!(matches!(result, Err(FetchError::Http { status: 404, .. })));
    }

    #[tokio::test]
    async fn test_load_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let mut fetcher = HttpFetcher::new(&SiteConfig::default()).unwrap();
        let result = fetcher
            .load(&format!("{}/slow", server.uri()), None, Duration::from_millis(50))
            .await;

        assert!(matches!(result, Err(FetchError::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_clicks_and_scripts_unsupported() {
        let mut fetcher = HttpFetcher::new(&SiteConfig::default()).unwrap();
        assert!(!fetcher.click_first_matching(&[".load-more".to_string()]).await);
        assert!(fetcher.run_script("return 1").await.is_err());
        assert!(fetcher.current_document().await.is_err());
    }
}
