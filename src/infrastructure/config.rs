//! Configuration infrastructure
//!
//! Contains configuration loading and management for the crawler.
//!
//! Configuration is organized into three sections:
//! 1. Crawl settings (waits, scrolling, browser window, fetcher backend)
//! 2. Export settings (output directory, JSON indent)
//! 3. Logging settings
//!
//! Site profiles are not part of the file; they are built from the
//! [`storefronts`] constants.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs;
use tracing::{info, warn};

use super::page_fetcher::WaitPolicy;
use crate::domain::{ExtractionProfile, ProductDetailSelectors, Storefront};

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Crawl timing and fetcher settings
    pub crawl: CrawlConfig,

    /// Output file settings
    pub export: ExportConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Which page fetcher drives the crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetcherBackend {
    /// Headless Chromium (requires the `browser` feature)
    Browser,
    /// Plain HTTP, no script execution
    Http,
}

/// Crawl settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Settle time after a page reports ready, in milliseconds
    pub page_load_delay_ms: u64,

    /// Pause between product page fetches, in milliseconds
    pub between_products_delay_ms: u64,

    /// Upper bound of the wait after each scroll, in milliseconds
    pub scroll_delay_ms: u64,

    /// Scrolls per category page
    pub scroll_iterations: u32,

    /// Cap on products crawled per category; `None` crawls all
    pub max_products_per_category: Option<usize>,

    /// Run the browser without a window
    pub headless: bool,

    pub window_width: u32,
    pub window_height: u32,
    pub user_agent: String,

    /// Page load / request timeout in seconds
    pub page_load_timeout_seconds: u64,

    pub fetcher: FetcherBackend,

    /// Replaces every profile's regex material vocabulary when set
    pub fabric_vocabulary: Option<Vec<String>>,
}

/// Export settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory the CSV/JSON files are written into
    pub output_dir: PathBuf,

    /// File stem used by the full run
    pub full_run_stem: String,

    /// Spaces per JSON indentation level
    pub json_indent: usize,
}

/// Logging configuration settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted logs (file output only)
    pub json_format: bool,

    /// Enable console output
    pub console_output: bool,

    /// Enable file output
    pub file_output: bool,

    /// Number of log files to keep (older files will be deleted)
    pub max_files: u32,

    /// Enable automatic log cleanup on startup
    pub auto_cleanup_logs: bool,

    /// Module-specific log level filters (e.g., "reqwest": "warn")
    pub module_filters: HashMap<String, String>,
}

impl CrawlConfig {
    pub fn page_load_delay(&self) -> Duration {
        Duration::from_millis(self.page_load_delay_ms)
    }

    pub fn between_products_delay(&self) -> Duration {
        Duration::from_millis(self.between_products_delay_ms)
    }

    pub fn scroll_delay(&self) -> Duration {
        Duration::from_millis(self.scroll_delay_ms)
    }

    /// Readiness wait policy for fetchers
    pub fn wait_policy(&self) -> WaitPolicy {
        WaitPolicy {
            page_load_delay: self.page_load_delay(),
            ready_timeout: Duration::from_secs(self.page_load_timeout_seconds),
            ..WaitPolicy::default()
        }
    }

    /// Built-in profile for `site` with the configured vocabulary applied
    pub fn profile_for(&self, site: Storefront) -> ExtractionProfile {
        let profile = storefronts::profile(site);
        match &self.fabric_vocabulary {
            Some(vocabulary) => profile.with_fabric_vocabulary(vocabulary.iter().cloned()),
            None => profile,
        }
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            page_load_delay_ms: defaults::PAGE_LOAD_DELAY_MS,
            between_products_delay_ms: defaults::BETWEEN_PRODUCTS_DELAY_MS,
            scroll_delay_ms: defaults::SCROLL_DELAY_MS,
            scroll_iterations: defaults::SCROLL_ITERATIONS,
            max_products_per_category: None,
            headless: defaults::HEADLESS,
            window_width: defaults::WINDOW_WIDTH,
            window_height: defaults::WINDOW_HEIGHT,
            user_agent: defaults::USER_AGENT.to_string(),
            page_load_timeout_seconds: defaults::PAGE_LOAD_TIMEOUT_SECONDS,
            fetcher: if cfg!(feature = "browser") {
                FetcherBackend::Browser
            } else {
                FetcherBackend::Http
            },
            fabric_vocabulary: None,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            full_run_stem: defaults::FULL_RUN_STEM.to_string(),
            json_indent: defaults::JSON_INDENT,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: defaults::LOG_JSON_FORMAT,
            console_output: defaults::LOG_CONSOLE_OUTPUT,
            file_output: defaults::LOG_FILE_OUTPUT,
            max_files: defaults::LOG_MAX_FILES,
            auto_cleanup_logs: defaults::LOG_AUTO_CLEANUP,
            module_filters: HashMap::new(),
        }
    }
}

/// Loads and saves [`AppConfig`] as JSON
pub struct ConfigManager {
    pub config_path: PathBuf,
}

impl ConfigManager {
    /// Get the application configuration directory
    pub fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get user config directory")?
            .join(defaults::APP_DIR_NAME);

        Ok(config_dir)
    }

    /// Configuration manager for the default location
    pub fn new() -> Result<Self> {
        let config_dir = Self::get_config_dir()?;
        Ok(Self::with_path(config_dir.join(defaults::CONFIG_FILE_NAME)))
    }

    pub fn with_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    /// Load configuration from file, creating default if it doesn't exist
    ///
    /// A file that fails to parse is copied to `*.json.corrupted` and replaced
    /// with the defaults.
    pub async fn load_config(&self) -> Result<AppConfig> {
        if !self.config_path.exists() {
            info!("Configuration file not found, creating default: {:?}", self.config_path);
            let default_config = AppConfig::default();
            self.save_config(&default_config).await?;
            return Ok(default_config);
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .context("Failed to read configuration file")?;

        match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => {
                info!("Loaded configuration from: {:?}", self.config_path);
                Ok(config)
            }
            Err(parse_error) => {
                warn!("⚠️  Configuration file could not be parsed: {}", parse_error);
                warn!("⚠️  Resetting to default configuration");

                let backup_path = self.config_path.with_extension("json.corrupted");
                if let Err(e) = fs::copy(&self.config_path, &backup_path).await {
                    warn!("Failed to create backup of corrupted config: {}", e);
                } else {
                    info!("Backed up corrupted config to: {:?}", backup_path);
                }

                let default_config = AppConfig::default();
                self.save_config(&default_config)
                    .await
                    .context("Failed to save default configuration")?;

                info!("✅ Reset to default configuration");
                Ok(default_config)
            }
        }
    }

    /// Save configuration to file
    pub async fn save_config(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create config directory")?;
        }

        let content =
            serde_json::to_string_pretty(config).context("Failed to serialize configuration")?;

        fs::write(&self.config_path, content)
            .await
            .context("Failed to write configuration file")?;

        info!("Saved configuration to: {:?}", self.config_path);
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }
}

/// Default configuration values
pub mod defaults {
    /// Directory name under the user config dir
    pub const APP_DIR_NAME: &str = "activewear-crawler";

    pub const CONFIG_FILE_NAME: &str = "activewear_crawler_config.json";

    /// Settle time after page load in milliseconds
    pub const PAGE_LOAD_DELAY_MS: u64 = 500;

    /// Delay between product fetches in milliseconds
    pub const BETWEEN_PRODUCTS_DELAY_MS: u64 = 50;

    /// Wait after each scroll in milliseconds
    pub const SCROLL_DELAY_MS: u64 = 150;

    pub const SCROLL_ITERATIONS: u32 = 1;

    pub const HEADLESS: bool = true;
    pub const WINDOW_WIDTH: u32 = 1920;
    pub const WINDOW_HEIGHT: u32 = 1080;

    pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

    pub const PAGE_LOAD_TIMEOUT_SECONDS: u64 = 30;

    /// Output file stem for the full run
    pub const FULL_RUN_STEM: &str = "activewear_output_download";

    /// Output file stem for a custom selection
    pub const CUSTOM_RUN_STEM: &str = "custom_products";

    pub const JSON_INDENT: usize = 2;

    pub const LOG_LEVEL: &str = "info";
    pub const LOG_JSON_FORMAT: bool = false;
    pub const LOG_CONSOLE_OUTPUT: bool = true;
    pub const LOG_FILE_OUTPUT: bool = true;
    pub const LOG_MAX_FILES: u32 = 10;
    pub const LOG_AUTO_CLEANUP: bool = true;
}

/// Built-in storefront profiles
pub mod storefronts {
    use super::{ExtractionProfile, ProductDetailSelectors, Storefront};

    pub mod kica {
        pub const BASE_URL: &str = "https://kicaactive.com";
        pub const CATEGORIES: &[&str] = &[
            "/collections/all",
            "/collections/sports-bras",
            "/collections/leggings",
            "/collections/tops",
            "/collections/flare-pants",
            "/collections/shorts",
            "/collections/tracks",
            "/collections/co-ord-sets",
            "/collections/sports-tanks",
        ];
        pub const NAME_SELECTORS: &[&str] = &["h1.product-title", "h1"];
        pub const DESCRIPTION_SELECTORS: &[&str] = &["div.product-description"];
        pub const FABRIC_KEYWORDS: &[&str] = &["fabric", "material", "composition", "blend"];
    }

    pub mod blissclub {
        pub const BASE_URL: &str = "https://blissclub.com";
        pub const CATEGORIES: &[&str] = &[
            "/collections/all",
            "/collections/sports-bras",
            "/collections/leggings",
            "/collections/tops",
            "/collections/shorts",
            "/collections/undies",
            "/collections/joggers",
            "/collections/jackets",
        ];
        pub const FABRIC_KEYWORDS: &[&str] = &["fabric details", "material", "composition"];
    }

    pub mod silvertraq {
        pub const BASE_URL: &str = "https://www.silvertraq.com";
        pub const CATEGORIES: &[&str] = &[
            "/collections/all",
            "/collections/sports-bras",
            "/collections/leggings",
            "/collections/tops",
            "/collections/jackets",
            "/collections/shorts",
            "/collections/co-ord-sets",
        ];
        pub const FABRIC_KEYWORDS: &[&str] = &["fabric", "material", "traqtech", "composition"];
    }

    pub mod terractive {
        pub const BASE_URL: &str = "https://terractive.in";
        pub const CATEGORIES: &[&str] = &[
            "/collections/all",
            "/collections/tees",
            "/collections/bottoms",
            "/collections/women",
            "/collections/men",
            "/collections/terrasoft",
        ];
        pub const FABRIC_KEYWORDS: &[&str] = &["fabric", "terrasoft", "material", "composition"];
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| (*s).to_string()).collect()
    }

    /// Built-in profile for one storefront
    pub fn profile(site: Storefront) -> ExtractionProfile {
        match site {
            Storefront::KicaActive => {
                let selectors = ProductDetailSelectors {
                    name: strings(kica::NAME_SELECTORS),
                    description: strings(kica::DESCRIPTION_SELECTORS),
                    ..ProductDetailSelectors::default()
                };
                ExtractionProfile::new(site, kica::BASE_URL)
                    .with_categories(kica::CATEGORIES.iter().copied())
                    .with_selectors(selectors)
                    .with_fabric_keywords(kica::FABRIC_KEYWORDS.iter().copied())
            }
            Storefront::BlissClub => ExtractionProfile::new(site, blissclub::BASE_URL)
                .with_categories(blissclub::CATEGORIES.iter().copied())
                .with_fabric_keywords(blissclub::FABRIC_KEYWORDS.iter().copied())
                .with_accordion_fallback(true),
            Storefront::SilverTraq => ExtractionProfile::new(site, silvertraq::BASE_URL)
                .with_categories(silvertraq::CATEGORIES.iter().copied())
                .with_fabric_keywords(silvertraq::FABRIC_KEYWORDS.iter().copied()),
            Storefront::TerraActive => ExtractionProfile::new(site, terractive::BASE_URL)
                .with_categories(terractive::CATEGORIES.iter().copied())
                .with_fabric_keywords(terractive::FABRIC_KEYWORDS.iter().copied()),
        }
    }
}
