//! Infrastructure layer for page fetching, parsing, crawling and export
//!
//! This module provides the fetcher sessions (browser and plain HTTP), HTML
//! parsing, the site crawler, file export, configuration and logging.

pub mod config;
pub mod crawling;
pub mod export;
pub mod logging;
pub mod page_fetcher;
pub mod parsing;
pub mod parsing_error;
pub mod simple_http_client;

#[cfg(feature = "browser")]
pub mod browser_fetcher;

// Re-export commonly used items
pub use config::{AppConfig, ConfigManager, CrawlConfig, ExportConfig, FetcherBackend, storefronts};
pub use crawling::{CrawlSettings, SiteCrawler};
pub use export::{ExportedFiles, RecordExporter};
pub use logging::{get_log_directory, init_logging, init_logging_with_config};
pub use page_fetcher::{FetchError, FetchResult, FetcherFactory, PageFetcher, WaitPolicy};
pub use parsing::{
    ContextualParser, DetailParseContext, ParseContext, ParsingError, ParsingResult,
    ProductDetailParser, ProductListParser,
};
pub use simple_http_client::{HttpClientConfig, HttpFetcher, HttpFetcherFactory};

#[cfg(feature = "browser")]
pub use browser_fetcher::{BrowserFetcher, BrowserFetcherConfig, BrowserFetcherFactory};
