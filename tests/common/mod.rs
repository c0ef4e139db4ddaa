//! Shared helpers for integration tests

#![allow(dead_code)]

use activewear_crawler::infrastructure::{FetchError, FetchResult, FetcherFactory, PageFetcher};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Serves canned pages keyed by URL
#[derive(Clone, Default)]
pub struct StaticSite {
    pages: HashMap<String, String>,
    pub loads: Arc<Mutex<Vec<String>>>,
    pub releases: Arc<AtomicUsize>,
}

impl StaticSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, markup: &str) -> Self {
        self.pages.insert(url.to_string(), markup.to_string());
        self
    }

    pub fn loads(&self) -> Vec<String> {
        self.loads.lock().unwrap().clone()
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

struct StaticSession {
    site: StaticSite,
    current: Option<String>,
}

#[async_trait]
impl PageFetcher for StaticSession {
    async fn load(&mut self, url: &str) -> FetchResult<String> {
        self.site.loads.lock().unwrap().push(url.to_string());
        let markup = self
            .site
            .pages
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Timeout {
                url: url.to_string(),
                timeout_ms: 30_000,
            })?;
        self.current = Some(markup.clone());
        Ok(markup)
    }

    async fn scroll_and_wait(&mut self, _iterations: u32, _delay: Duration) -> FetchResult<()> {
        Ok(())
    }

    async fn page_source(&mut self) -> FetchResult<String> {
        self.current.clone().ok_or(FetchError::Released)
    }

    async fn release(&mut self) -> FetchResult<()> {
        self.site.releases.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl FetcherFactory for StaticSite {
    async fn acquire(&self) -> FetchResult<Box<dyn PageFetcher>> {
        Ok(Box::new(StaticSession {
            site: self.clone(),
            current: None,
        }))
    }

    fn name(&self) -> &'static str {
        "static"
    }
}
