//! Test utilities
//!
//! An in-memory fetcher serving canned markup, with a shared log of what the
//! crawler asked for.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::infrastructure::page_fetcher::{FetchError, FetchResult, FetcherFactory, PageFetcher};

const LOST_SESSION: &str = "\0lost-session";

/// Everything the scripted sessions observed
#[derive(Debug, Default, Clone)]
pub struct FetchLog {
    pub sessions: usize,
    pub loads: Vec<String>,
    pub scrolls: u32,
    pub released: usize,
}

#[derive(Clone, Default)]
pub struct ScriptedFetcherFactory {
    pages: HashMap<String, String>,
    fail_acquire: bool,
    log: Arc<Mutex<FetchLog>>,
}

impl ScriptedFetcherFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `markup` for `url`; unknown URLs fail with a navigation error
    pub fn with_page(mut self, url: impl Into<String>, markup: impl Into<String>) -> Self {
        self.pages.insert(url.into(), markup.into());
        self
    }

    /// Loading `url` reports the session as gone
    pub fn with_lost_session_at(mut self, url: impl Into<String>) -> Self {
        self.pages.insert(url.into(), LOST_SESSION.to_string());
        self
    }

    pub fn failing_acquire(mut self) -> Self {
        self.fail_acquire = true;
        self
    }

    pub fn log(&self) -> FetchLog {
        self.log.lock().unwrap().clone()
    }
}

#[async_trait]
impl FetcherFactory for ScriptedFetcherFactory {
    async fn acquire(&self) -> FetchResult<Box<dyn PageFetcher>> {
        if self.fail_acquire {
            return Err(FetchError::SessionStart("scripted launch failure".to_string()));
        }
        self.log.lock().unwrap().sessions += 1;
        Ok(Box::new(ScriptedFetcher {
            pages: self.pages.clone(),
            log: Arc::clone(&self.log),
            current: None,
            released: false,
        }))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

pub struct ScriptedFetcher {
    pages: HashMap<String, String>,
    log: Arc<Mutex<FetchLog>>,
    current: Option<String>,
    released: bool,
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn load(&mut self, url: &str) -> FetchResult<String> {
        if self.released {
            return Err(FetchError::Released);
        }
        self.log.lock().unwrap().loads.push(url.to_string());
        let markup = self
            .pages
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::navigation(url, "404 Not Found"))?;
        if markup == LOST_SESSION {
            return Err(FetchError::SessionLost("scripted disconnect".to_string()));
        }
        self.current = Some(markup.clone());
        Ok(markup)
    }

    async fn scroll_and_wait(&mut self, iterations: u32, _delay: Duration) -> FetchResult<()> {
        self.log.lock().unwrap().scrolls += iterations;
        Ok(())
    }

    async fn page_source(&mut self) -> FetchResult<String> {
        self.current
            .clone()
            .ok_or_else(|| FetchError::navigation("about:blank", "no page loaded"))
    }

    async fn release(&mut self) -> FetchResult<()> {
        if self.released {
            return Err(FetchError::Released);
        }
        self.released = true;
        self.log.lock().unwrap().released += 1;
        Ok(())
    }
}
