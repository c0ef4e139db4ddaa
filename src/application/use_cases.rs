//! Crawl use case
//!
//! Turns a [`RunMode`] into profiles, crawls them and exports the results.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use super::run_modes::RunMode;
use crate::domain::ExtractionProfile;
use crate::infrastructure::config::{AppConfig, CrawlConfig, ExportConfig, FetcherBackend};
use crate::infrastructure::crawling::{CrawlSettings, SiteCrawler};
use crate::infrastructure::export::{ExportedFiles, RecordExporter};
use crate::infrastructure::page_fetcher::FetcherFactory;
use crate::infrastructure::simple_http_client::{HttpClientConfig, HttpFetcherFactory};

/// Outcome of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub total_products: usize,
    pub with_fabric_details: usize,
    pub files: ExportedFiles,
}

/// Fetcher factory for the configured backend
pub fn build_fetcher_factory(crawl: &CrawlConfig) -> Result<Arc<dyn FetcherFactory>> {
    match crawl.fetcher {
        FetcherBackend::Http => Ok(Arc::new(HttpFetcherFactory::new(
            HttpClientConfig::from_crawl_config(crawl),
        ))),
        #[cfg(feature = "browser")]
        FetcherBackend::Browser => {
            use crate::infrastructure::browser_fetcher::{BrowserFetcherConfig, BrowserFetcherFactory};
            Ok(Arc::new(BrowserFetcherFactory::new(
                BrowserFetcherConfig::from_crawl_config(crawl),
            )))
        }
        #[cfg(not(feature = "browser"))]
        FetcherBackend::Browser => Err(anyhow::anyhow!(
            "Browser fetcher requested but this build has no browser support; set crawl.fetcher to \"http\""
        )),
    }
}

pub struct CrawlUseCases {
    crawler: SiteCrawler,
    exporter: RecordExporter,
    crawl_config: CrawlConfig,
    export_config: ExportConfig,
}

impl CrawlUseCases {
    pub fn new(config: &AppConfig, factory: Arc<dyn FetcherFactory>) -> Result<Self> {
        Ok(Self {
            crawler: SiteCrawler::new(factory, CrawlSettings::from_crawl_config(&config.crawl))?,
            exporter: RecordExporter::from_config(&config.export),
            crawl_config: config.crawl.clone(),
            export_config: config.export.clone(),
        })
    }

    /// Use cases wired to the configured fetcher backend
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(config, build_fetcher_factory(&config.crawl)?)
    }

    pub fn profiles(&self, mode: &RunMode) -> Vec<ExtractionProfile> {
        mode.sites()
            .into_iter()
            .map(|site| self.crawl_config.profile_for(site))
            .collect()
    }

    /// Crawl every site of `mode`, then export once
    pub async fn run(&self, mode: &RunMode) -> Result<RunSummary> {
        let settings = self.crawler.settings();
        info!(
            "🚀 Starting {} ({} scroll(s) per category, {:?} between products, output in {})",
            mode,
            settings.scroll_iterations,
            settings.between_products_delay,
            self.exporter.output_dir().display()
        );

        let results = self
            .crawler
            .crawl_sites(&self.profiles(mode))
            .await
            .with_context(|| format!("Crawl failed during {mode}"))?;

        let stem = mode.output_stem(&self.export_config);
        let files = self.exporter.export_all(&results, &stem)?;

        let summary = RunSummary {
            total_products: results.len(),
            with_fabric_details: results.iter().filter(|r| r.has_fabric_details()).count(),
            files,
        };
        info!(
            "CRAWL COMPLETE - Total Products: {} ({} with fabric details)",
            summary.total_products, summary.with_fabric_details
        );
        Ok(summary)
    }
}
