//! Site crawler
//!
//! One generic crawler driven by an [`ExtractionProfile`]: categories, then
//! discovered product links, then one record per product page. Execution is
//! strictly sequential with a fixed pause between products and no retries.

use anyhow::{Context, Result, anyhow};
use scraper::Html;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, warn};

use super::config::CrawlConfig;
use super::page_fetcher::{FetchError, FetchResult, FetcherFactory, PageFetcher};
use super::parsing::{
    ContextualParser, DetailParseContext, ParseContext, ProductDetailParser, ProductListParser,
};
use crate::domain::{ExtractionProfile, ProductRecord, ResultSet};

/// Pacing and limits for one crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSettings {
    pub scroll_iterations: u32,
    pub scroll_delay: Duration,
    pub between_products_delay: Duration,
    pub max_products_per_category: Option<usize>,
}

impl CrawlSettings {
    pub fn from_crawl_config(config: &CrawlConfig) -> Self {
        Self {
            scroll_iterations: config.scroll_iterations,
            scroll_delay: config.scroll_delay(),
            between_products_delay: config.between_products_delay(),
            max_products_per_category: config.max_products_per_category,
        }
    }
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self::from_crawl_config(&CrawlConfig::default())
    }
}

/// Crawls storefronts through a [`FetcherFactory`]
pub struct SiteCrawler {
    factory: Arc<dyn FetcherFactory>,
    settings: CrawlSettings,
    list_parser: ProductListParser,
}

impl SiteCrawler {
    pub fn new(factory: Arc<dyn FetcherFactory>, settings: CrawlSettings) -> Result<Self> {
        Ok(Self {
            factory,
            settings,
            list_parser: ProductListParser::new().context("Failed to create product list parser")?,
        })
    }

    pub fn settings(&self) -> &CrawlSettings {
        &self.settings
    }

    /// Crawl every category of one site
    ///
    /// A fetch session is acquired up front and released on every exit path.
    /// Category and product failures are logged and skipped; only a failure to
    /// start or keep the session is returned as an error.
    pub async fn crawl_site(&self, profile: &ExtractionProfile) -> Result<ResultSet> {
        info!("=== Starting {} crawl ===", profile.brand);

        let list_context = ParseContext::try_for_profile(profile)
            .with_context(|| format!("Invalid extraction profile for {}", profile.brand))?;
        let detail_parser = ProductDetailParser::with_profile(profile)
            .with_context(|| format!("Invalid extraction profile for {}", profile.brand))?;

        let mut fetcher = self.factory.acquire().await.with_context(|| {
            format!(
                "Failed to start {} fetch session for {}",
                self.factory.name(),
                profile.brand
            )
        })?;

        let outcome = self
            .crawl_with(fetcher.as_mut(), profile, &list_context, &detail_parser)
            .await;

        if let Err(e) = fetcher.release().await {
            warn!("Failed to release fetch session for {}: {}", profile.brand, e);
        }

        let results = outcome?;
        let with_fabric = results.iter().filter(|r| r.has_fabric_details()).count();
        info!(
            "=== {} crawl finished: {} products ({} with fabric details) ===",
            profile.brand,
            results.len(),
            with_fabric
        );
        Ok(results)
    }

    /// Crawl several sites in order into one result set
    pub async fn crawl_sites(&self, profiles: &[ExtractionProfile]) -> Result<ResultSet> {
        let mut results = ResultSet::new();
        for profile in profiles {
            results.append(self.crawl_site(profile).await?);
        }
        Ok(results)
    }

    async fn crawl_with(
        &self,
        fetcher: &mut dyn PageFetcher,
        profile: &ExtractionProfile,
        list_context: &ParseContext,
        detail_parser: &ProductDetailParser,
    ) -> Result<ResultSet> {
        let mut results = ResultSet::new();

        for category_url in profile.category_urls() {
            info!("Crawling category: {}", category_url);

            let links = match self.discover_links(fetcher, list_context, &category_url).await {
                Ok(links) => links,
                Err(e) if e.is_session_lost() => {
                    return Err(anyhow!(e).context(format!("Fetch session lost on {category_url}")));
                }
                Err(e) => {
                    error!("✗ Skipping category {}: {}", category_url, e);
                    continue;
                }
            };
            info!("Found {} products in this category", links.len());

            let limit = self.settings.max_products_per_category.unwrap_or(links.len());
            for product_url in links.iter().take(limit) {
                match self
                    .crawl_product(fetcher, profile, detail_parser, product_url)
                    .await
                {
                    Ok(record) => {
                        info!("✓ Extracted: {}", record.product_name);
                        results.push(record);
                    }
                    Err(e) if e.is_session_lost() => {
                        return Err(anyhow!(e).context(format!("Fetch session lost on {product_url}")));
                    }
                    Err(e) => error!("✗ Error crawling {}: {}", product_url, e),
                }

                if !self.settings.between_products_delay.is_zero() {
                    sleep(self.settings.between_products_delay).await;
                }
            }
        }

        Ok(results)
    }

    async fn discover_links(
        &self,
        fetcher: &mut dyn PageFetcher,
        list_context: &ParseContext,
        category_url: &str,
    ) -> FetchResult<Vec<String>> {
        fetcher.load(category_url).await?;
        fetcher
            .scroll_and_wait(self.settings.scroll_iterations, self.settings.scroll_delay)
            .await?;
        let markup = fetcher.page_source().await?;

        // Html is not Send; keep it out of any await
        let links = {
            let html = Html::parse_document(&markup);
            let context = list_context.clone().with_page_url(category_url);
            self.list_parser.parse_with_context(&html, &context)
        };
        Ok(links)
    }

    async fn crawl_product(
        &self,
        fetcher: &mut dyn PageFetcher,
        profile: &ExtractionProfile,
        detail_parser: &ProductDetailParser,
        product_url: &str,
    ) -> Result<ProductRecord, FetchError> {
        let markup = fetcher.load(product_url).await?;

        let record = {
            let html = Html::parse_document(&markup);
            let context = DetailParseContext::new(product_url, profile.brand.clone());
            detail_parser.parse_with_context(&html, &context)
        };
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Storefront;
    use crate::domain::constants::record::NOT_FOUND;
    use crate::test_utils::ScriptedFetcherFactory;

    const BASE: &str = "https://shop.test";

    fn profile() -> ExtractionProfile {
        ExtractionProfile::new(Storefront::TerraActive, BASE)
            .with_categories(["/collections/all", "/collections/tees"])
            .with_fabric_keywords(["fabric"])
    }

    fn settings(max: Option<usize>) -> CrawlSettings {
        CrawlSettings {
            scroll_iterations: 2,
            scroll_delay: Duration::ZERO,
            between_products_delay: Duration::ZERO,
            max_products_per_category: max,
        }
    }

    fn product_page(name: &str) -> String {
        format!(
            r#"<h1>{name}</h1><span class="price">Rs. 999</span>
               <h4>Fabric</h4><ul><li>100% Cotton</li></ul>"#
        )
    }

    fn factory() -> ScriptedFetcherFactory {
        ScriptedFetcherFactory::new()
            .with_page(
                format!("{BASE}/collections/all"),
                r#"<a href="/products/a">A</a><a href="/products/missing">M</a>
                   <a href="/products/b">B</a><a href="/pages/about">About</a>"#,
            )
            .with_page(
                format!("{BASE}/collections/tees"),
                r#"<a href="/products/b">B</a>"#,
            )
            .with_page(format!("{BASE}/products/a"), product_page("Tee A"))
            .with_page(format!("{BASE}/products/b"), "<p>no fields</p>")
    }

    #[tokio::test]
    async fn test_failed_product_is_skipped() {
        let factory = factory();
        let crawler = SiteCrawler::new(Arc::new(factory.clone()), settings(None)).unwrap();

        let results = crawler.crawl_site(&profile()).await.unwrap();

        let names: Vec<&str> = results.iter().map(|r| r.product_name.as_str()).collect();
        assert_eq!(names, vec!["Tee A", NOT_FOUND, NOT_FOUND]);
        assert_eq!(results.records()[0].fabric_details, "100% Cotton");
        assert!(results.iter().all(|r| r.brand == "Terra-active"));

        let log = factory.log();
        assert_eq!(log.sessions, 1);
        assert_eq!(log.released, 1);
        assert_eq!(log.scrolls, 4);
        assert!(log.loads.contains(&format!("{BASE}/products/missing")));
    }

    #[tokio::test]
    async fn test_per_category_cap() {
        let factory = factory();
        let crawler = SiteCrawler::new(Arc::new(factory.clone()), settings(Some(1))).unwrap();

        let results = crawler.crawl_site(&profile()).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(
            factory.log().loads,
            vec![
                format!("{BASE}/collections/all"),
                format!("{BASE}/products/a"),
                format!("{BASE}/collections/tees"),
                format!("{BASE}/products/b"),
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_category_is_skipped() {
        let factory = ScriptedFetcherFactory::new()
            .with_page(format!("{BASE}/collections/tees"), r#"<a href="/products/a">A</a>"#)
            .with_page(format!("{BASE}/products/a"), product_page("Tee A"));
        let crawler = SiteCrawler::new(Arc::new(factory.clone()), settings(None)).unwrap();

        let results = crawler.crawl_site(&profile()).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(factory.log().released, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_between_products() {
        let delay = Duration::from_millis(250);
        let paced = CrawlSettings {
            between_products_delay: delay,
            ..settings(None)
        };
        let crawler = SiteCrawler::new(Arc::new(factory()), paced).unwrap();

        let started = tokio::time::Instant::now();
        crawler.crawl_site(&profile()).await.unwrap();

        // three links on the first category, one on the second; failures are paced too
        assert!(started.elapsed() >= delay * 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_delay_does_not_sleep() {
        let crawler = SiteCrawler::new(Arc::new(factory()), settings(None)).unwrap();

        let started = tokio::time::Instant::now();
        crawler.crawl_site(&profile()).await.unwrap();

        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_session_released_when_crawl_aborts() {
        let factory = factory().with_lost_session_at(format!("{BASE}/products/a"));
        let crawler = SiteCrawler::new(Arc::new(factory.clone()), settings(None)).unwrap();

        assert!(crawler.crawl_site(&profile()).await.is_err());
        assert_eq!(factory.log().released, 1);
    }

    #[tokio::test]
    async fn test_invalid_profile_fails_before_acquire() {
        let factory = factory();
        let crawler = SiteCrawler::new(Arc::new(factory.clone()), settings(None)).unwrap();
        let broken = profile().with_link_pattern("");

        assert!(crawler.crawl_site(&broken).await.is_err());
        assert_eq!(factory.log().sessions, 0);
    }

    #[tokio::test]
    async fn test_acquire_failure_is_an_error() {
        let factory = ScriptedFetcherFactory::new().failing_acquire();
        let crawler = SiteCrawler::new(Arc::new(factory.clone()), settings(None)).unwrap();

        assert!(crawler.crawl_site(&profile()).await.is_err());
        assert_eq!(factory.log().sessions, 0);
    }

    #[tokio::test]
    async fn test_crawl_sites_uses_one_session_per_site() {
        let factory = factory();
        let crawler = SiteCrawler::new(Arc::new(factory.clone()), settings(Some(1))).unwrap();
        let other = ExtractionProfile::new(Storefront::SilverTraq, BASE)
            .with_categories(["/collections/tees"]);

        let results = crawler.crawl_sites(&[profile(), other]).await.unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results.records()[2].brand, "SilverTraq");
        let log = factory.log();
        assert_eq!((log.sessions, log.released), (2, 2));
    }
}
