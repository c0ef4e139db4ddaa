//! Page fetching abstraction
//!
//! The crawler only needs rendered markup for a URL. Sessions are acquired
//! from a [`FetcherFactory`] once per site crawl and must be released on every
//! exit path.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while fetching a page
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to start fetch session: {0}")]
    SessionStart(String),

    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Timed out after {timeout_ms}ms waiting for {url}")]
    Timeout { url: String, timeout_ms: u64 },

    #[error("HTTP request failed: {status} - {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Browser command failed: {0}")]
    Browser(String),

    #[error("Connection to the fetch session was lost: {0}")]
    SessionLost(String),

    #[error("Fetch session already released")]
    Released,
}

impl FetchError {
    pub fn navigation(url: &str, reason: impl ToString) -> Self {
        Self::Navigation {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn timeout(url: &str, timeout: Duration) -> Self {
        Self::Timeout {
            url: url.to_string(),
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// The session itself is gone; later calls on it cannot succeed
    pub fn is_session_lost(&self) -> bool {
        matches!(self, Self::Released | Self::SessionLost(_))
    }
}

pub type FetchResult<T> = Result<T, FetchError>;

/// How long to wait for pages to become ready
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    /// Settle time after the page reports ready
    pub page_load_delay: Duration,

    /// Upper bound for any readiness wait
    pub ready_timeout: Duration,

    /// Interval between readiness checks
    pub poll_interval: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            page_load_delay: Duration::from_millis(500),
            ready_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(100),
        }
    }
}

/// A single page-fetching session (one browser, one HTTP client, ...)
#[async_trait]
pub trait PageFetcher: Send {
    /// Navigate to `url` and return the rendered markup
    async fn load(&mut self, url: &str) -> FetchResult<String>;

    /// Scroll to the bottom `iterations` times, waiting up to `delay` between scrolls
    async fn scroll_and_wait(&mut self, iterations: u32, delay: Duration) -> FetchResult<()>;

    /// Markup of the current page, including content loaded after `load`
    async fn page_source(&mut self) -> FetchResult<String>;

    /// Close the session; further calls fail with [`FetchError::Released`]
    async fn release(&mut self) -> FetchResult<()>;
}

/// Creates fetcher sessions
#[async_trait]
pub trait FetcherFactory: Send + Sync {
    async fn acquire(&self) -> FetchResult<Box<dyn PageFetcher>>;

    /// Label for logs
    fn name(&self) -> &'static str;
}
