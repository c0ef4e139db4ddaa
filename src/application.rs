//! Application layer module
//!
//! Run modes and the crawl use case that ties crawling and export together.

pub mod run_modes;
pub mod use_cases;

pub use run_modes::RunMode;
pub use use_cases::{CrawlUseCases, RunSummary, build_fetcher_factory};
