//! End-to-end crawl of a canned storefront

mod common;

use activewear_crawler::domain::constants::record::NOT_FOUND;
use activewear_crawler::domain::{ExtractionProfile, Storefront};
use activewear_crawler::infrastructure::{CrawlSettings, SiteCrawler};
use common::StaticSite;
use std::sync::Arc;
use std::time::Duration;

const BASE: &str = "https://kicaactive.com";

fn settings() -> CrawlSettings {
    CrawlSettings {
        scroll_iterations: 1,
        scroll_delay: Duration::ZERO,
        between_products_delay: Duration::from_millis(1),
        max_products_per_category: None,
    }
}

fn profile() -> ExtractionProfile {
    ExtractionProfile::new(Storefront::KicaActive, BASE)
        .with_categories(["/collections/leggings", "/collections/broken"])
        .with_fabric_keywords(["fabric", "material"])
}

fn site() -> StaticSite {
    StaticSite::new()
        .page(
            &format!("{BASE}/collections/leggings"),
            r#"<a href="/products/core">Core</a>
               <a href="/products/timeout">Timeout</a>
               <a href="/products/plain">Plain</a>"#,
        )
        .page(
            &format!("{BASE}/products/core"),
            r#"<h1>Core Leggings</h1><span class="money">Rs. 1,499</span>
               <p>Material</p><ul><li>75% Nylon</li><li>25% Spandex</li></ul>"#,
        )
        .page(&format!("{BASE}/products/plain"), "<h1>Plain Tee</h1>")
}

#[tokio::test]
async fn one_failed_product_does_not_abort_the_queue() {
    let site = site();
    let crawler = SiteCrawler::new(Arc::new(site.clone()), settings()).unwrap();

    let results = crawler.crawl_site(&profile()).await.unwrap();

    assert_eq!(results.len(), 2);
    let core = &results.records()[0];
    assert_eq!(core.product_name, "Core Leggings");
    assert_eq!(core.price, "Rs. 1,499");
    assert_eq!(core.fabric_details, "75% Nylon | 25% Spandex");
    assert_eq!(core.url, format!("{BASE}/products/core"));

    let plain = &results.records()[1];
    assert_eq!(plain.price, NOT_FOUND);
    assert_eq!(plain.fabric_details, NOT_FOUND);

    assert!(site.loads().contains(&format!("{BASE}/products/timeout")));
    assert!(site.loads().contains(&format!("{BASE}/collections/broken")));
    assert_eq!(site.releases(), 1);
}
