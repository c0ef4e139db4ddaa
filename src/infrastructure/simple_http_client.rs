//! Plain HTTP page fetcher
//!
//! Fetches server-rendered markup with `reqwest`. Scripts are not executed, so
//! lazily loaded content never appears and scrolling is a no-op; use it for
//! storefronts that render product grids server-side or when the `browser`
//! feature is disabled. No retries: a failed request is reported once.

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::{debug, error, info};

use super::config::CrawlConfig;
use super::page_fetcher::{FetchError, FetchResult, FetcherFactory, PageFetcher};

/// Configuration for HTTP client behavior
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
    /// Whether to follow redirects
    pub follow_redirects: bool,
}

impl HttpClientConfig {
    /// Create HttpClientConfig from CrawlConfig
    pub fn from_crawl_config(crawl_config: &CrawlConfig) -> Self {
        Self {
            timeout_seconds: crawl_config.page_load_timeout_seconds,
            user_agent: crawl_config.user_agent.clone(),
            follow_redirects: true,
        }
    }
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self::from_crawl_config(&CrawlConfig::default())
    }
}

/// HTTP fetch session
pub struct HttpFetcher {
    client: Option<Client>,
    last_markup: Option<String>,
}

impl HttpFetcher {
    /// Create a new HTTP fetcher with custom configuration
    pub fn with_config(config: &HttpClientConfig) -> FetchResult<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .cookie_store(true)
            .gzip(true)
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            })
            .build()
            .map_err(|e| FetchError::SessionStart(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client: Some(client),
            last_markup: None,
        })
    }

    fn client(&self) -> FetchResult<&Client> {
        self.client.as_ref().ok_or(FetchError::Released)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn load(&mut self, url: &str) -> FetchResult<String> {
        info!("🌐 HTTP GET: {}", url);
        let response = self
            .client()?
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            error!("❌ HTTP error {}: {}", status, url);
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let markup = response.text().await.map_err(|source| FetchError::Http {
            url: url.to_string(),
            source,
        })?;

        if markup.is_empty() {
            return Err(FetchError::navigation(url, "empty response body"));
        }

        self.last_markup = Some(markup.clone());
        Ok(markup)
    }

    async fn scroll_and_wait(&mut self, iterations: u32, _delay: Duration) -> FetchResult<()> {
        self.client()?;
        debug!("Scroll requested ({} iterations); plain HTTP pages are static", iterations);
        Ok(())
    }

    async fn page_source(&mut self) -> FetchResult<String> {
        self.client()?;
        self.last_markup
            .clone()
            .ok_or_else(|| FetchError::navigation("about:blank", "no page loaded yet"))
    }

    async fn release(&mut self) -> FetchResult<()> {
        self.client.take().ok_or(FetchError::Released)?;
        self.last_markup = None;
        debug!("HTTP fetch session released");
        Ok(())
    }
}

/// Creates one [`HttpFetcher`] per site crawl
pub struct HttpFetcherFactory {
    config: HttpClientConfig,
}

impl HttpFetcherFactory {
    pub fn new(config: HttpClientConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl FetcherFactory for HttpFetcherFactory {
    async fn acquire(&self) -> FetchResult<Box<dyn PageFetcher>> {
        Ok(Box::new(HttpFetcher::with_config(&self.config)?))
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        assert!(HttpFetcher::with_config(&HttpClientConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn test_released_session_rejects_calls() {
        let mut fetcher = HttpFetcher::with_config(&HttpClientConfig::default()).unwrap();
        fetcher.release().await.unwrap();

        assert!(matches!(fetcher.release().await, Err(FetchError::Released)));
        assert!(matches!(
            fetcher.load("https://kicaactive.com").await,
            Err(FetchError::Released)
        ));
    }

    #[tokio::test]
    async fn test_page_source_before_load_is_an_error() {
        let mut fetcher = HttpFetcher::with_config(&HttpClientConfig::default()).unwrap();
        assert!(fetcher.page_source().await.is_err());
        assert!(fetcher.scroll_and_wait(3, Duration::from_millis(1)).await.is_ok());
    }
}
