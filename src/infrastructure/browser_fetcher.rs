//! Headless Chromium page fetcher
//!
//! One browser process per session. Readiness is polled instead of slept:
//! `load` waits for `document.readyState == "complete"` and `scroll_and_wait`
//! waits for `document.body.scrollHeight` to grow, both bounded by the
//! [`WaitPolicy`].

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::error::CdpError;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, trace, warn};

use super::config::CrawlConfig;
use super::page_fetcher::{FetchError, FetchResult, FetcherFactory, PageFetcher, WaitPolicy};

const READY_STATE_SCRIPT: &str = "document.readyState";
const SCROLL_HEIGHT_SCRIPT: &str = "document.body ? document.body.scrollHeight : 0";
const SCROLL_TO_BOTTOM_SCRIPT: &str =
    "window.scrollTo(0, document.body ? document.body.scrollHeight : 0); true";

/// Map a CDP error, treating a dead connection to the browser as a lost session
fn classify_cdp_error(e: CdpError, otherwise: impl FnOnce(String) -> FetchError) -> FetchError {
    match e {
        CdpError::Ws(_) | CdpError::ChannelSendError(_) | CdpError::NoResponse => {
            FetchError::SessionLost(e.to_string())
        }
        other => otherwise(other.to_string()),
    }
}

/// Browser launch settings
#[derive(Debug, Clone)]
pub struct BrowserFetcherConfig {
    pub headless: bool,
    pub window_width: u32,
    pub window_height: u32,
    pub user_agent: String,
    pub wait: WaitPolicy,
}

impl BrowserFetcherConfig {
    pub fn from_crawl_config(crawl_config: &CrawlConfig) -> Self {
        Self {
            headless: crawl_config.headless,
            window_width: crawl_config.window_width,
            window_height: crawl_config.window_height,
            user_agent: crawl_config.user_agent.clone(),
            wait: crawl_config.wait_policy(),
        }
    }

    fn to_browser_config(&self) -> FetchResult<BrowserConfig> {
        let mut builder = BrowserConfig::builder()
            .window_size(self.window_width, self.window_height)
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .arg(format!("--user-agent={}", self.user_agent));

        if !self.headless {
            builder = builder.with_head();
        }

        builder
            .build()
            .map_err(|e| FetchError::SessionStart(format!("Failed to build browser config: {e}")))
    }
}

impl Default for BrowserFetcherConfig {
    fn default() -> Self {
        Self::from_crawl_config(&CrawlConfig::default())
    }
}

/// A running browser with a single tab
pub struct BrowserFetcher {
    browser: Option<Browser>,
    page: Option<Page>,
    handler_task: Option<JoinHandle<()>>,
    wait: WaitPolicy,
}

impl BrowserFetcher {
    pub async fn launch(config: &BrowserFetcherConfig) -> FetchResult<Self> {
        info!(
            "🚀 Launching browser (headless={}, {}x{})",
            config.headless, config.window_width, config.window_height
        );

        let (browser, mut handler) = Browser::launch(config.to_browser_config()?)
            .await
            .map_err(|e| FetchError::SessionStart(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    trace!("Browser handler event error: {}", e);
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler_task.abort();
                return Err(FetchError::SessionStart(format!("Failed to create new page: {e}")));
            }
        };

        Ok(Self {
            browser: Some(browser),
            page: Some(page),
            handler_task: Some(handler_task),
            wait: config.wait,
        })
    }

    fn page(&self) -> FetchResult<&Page> {
        self.page.as_ref().ok_or(FetchError::Released)
    }

    async fn evaluate<T: serde::de::DeserializeOwned>(&self, script: &str) -> FetchResult<T> {
        self.page()?
            .evaluate(script)
            .await
            .map_err(|e| classify_cdp_error(e, FetchError::Browser))?
            .into_value()
            .map_err(|e| FetchError::Browser(e.to_string()))
    }

    async fn scroll_height(&self) -> FetchResult<u64> {
        self.evaluate(SCROLL_HEIGHT_SCRIPT).await
    }

    /// Poll until the document reports `complete` or the policy timeout elapses
    async fn wait_until_ready(&self, url: &str) -> FetchResult<()> {
        let deadline = Instant::now() + self.wait.ready_timeout;
        loop {
            let state: String = self.evaluate(READY_STATE_SCRIPT).await?;
            if state == "complete" {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(FetchError::timeout(url, self.wait.ready_timeout));
            }
            sleep(self.wait.poll_interval).await;
        }
    }
}

#[async_trait]
impl PageFetcher for BrowserFetcher {
    async fn load(&mut self, url: &str) -> FetchResult<String> {
        info!("🌐 Navigating to: {}", url);
        self.page()?
            .goto(url)
            .await
            .map_err(|e| classify_cdp_error(e, |reason| FetchError::navigation(url, reason)))?;

        self.wait_until_ready(url).await?;
        sleep(self.wait.page_load_delay).await;

        self.page_source().await
    }

    async fn scroll_and_wait(&mut self, iterations: u32, delay: Duration) -> FetchResult<()> {
        for i in 0..iterations {
            let before = self.scroll_height().await?;
            let _: bool = self.evaluate(SCROLL_TO_BOTTOM_SCRIPT).await?;

            let deadline = Instant::now() + delay;
            let mut grown = false;
            while Instant::now() < deadline {
                sleep(self.wait.poll_interval.min(delay)).await;
                if self.scroll_height().await? > before {
                    grown = true;
                    break;
                }
            }
            debug!("Scroll {}/{}: page height grew = {}", i + 1, iterations, grown);
        }
        Ok(())
    }

    async fn page_source(&mut self) -> FetchResult<String> {
        self.page()?
            .content()
            .await
            .map_err(|e| classify_cdp_error(e, FetchError::Browser))
    }

    async fn release(&mut self) -> FetchResult<()> {
        let mut browser = self.browser.take().ok_or(FetchError::Released)?;
        self.page = None;
        info!("🔒 Closing browser");

        let result = match browser.close().await {
            Ok(_) => browser
                .wait()
                .await
                .map(|_| ())
                .map_err(|e| FetchError::Browser(e.to_string())),
            Err(e) => Err(FetchError::Browser(e.to_string())),
        };

        if let Some(task) = self.handler_task.take() {
            task.abort();
        }
        result
    }
}

impl Drop for BrowserFetcher {
    fn drop(&mut self) {
        if self.browser.is_some() {
            warn!("Browser session dropped without release");
        }
        if let Some(task) = self.handler_task.take() {
            task.abort();
        }
    }
}

/// Launches one browser per site crawl
pub struct BrowserFetcherFactory {
    config: BrowserFetcherConfig,
}

impl BrowserFetcherFactory {
    pub fn new(config: BrowserFetcherConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl FetcherFactory for BrowserFetcherFactory {
    async fn acquire(&self) -> FetchResult<Box<dyn PageFetcher>> {
        Ok(Box::new(BrowserFetcher::launch(&self.config).await?))
    }

    fn name(&self) -> &'static str {
        "browser"
    }
}
