//! Product list parser
//!
//! Link discovery for category pages: every anchor whose href contains the
//! profile's product-path pattern, absolutized against the site base URL,
//! deduplicated by exact string equality, in document order.

use scraper::{Html, Selector};
use tracing::{debug, warn};
use url::Url;

use super::selectors::compile_one;
use super::{ContextualParser, ParseContext, ParsingError, ParsingResult};

/// Parser for extracting product page links from category pages
pub struct ProductListParser {
    anchor_selector: Selector,
}

impl ProductListParser {
    pub fn new() -> ParsingResult<Self> {
        Ok(Self {
            anchor_selector: compile_one("a")?,
        })
    }

    /// Ordered, deduplicated absolute product URLs referenced by the page
    ///
    /// Anchors without an href, with an empty href, or with an href that cannot
    /// be turned into a valid URL are skipped. No match yields an empty vector.
    pub fn discover_links(&self, html: &Html, context: &ParseContext) -> Vec<String> {
        let mut links: Vec<String> = Vec::new();
        let mut skipped = 0usize;

        for anchor in html.select(&self.anchor_selector) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let href = href.trim();
            if href.is_empty() || !href.contains(&context.link_pattern) {
                continue;
            }

            match Self::resolve_url(href, &context.base_url) {
                Ok(url) => {
                    if !links.contains(&url) {
                        links.push(url);
                    }
                }
                Err(e) => {
                    skipped += 1;
                    warn!("Skipping product link: {}", e);
                }
            }
        }

        debug!(
            "Discovered {} product links on {} ({} skipped)",
            links.len(),
            context.page_url.as_deref().unwrap_or("category page"),
            skipped
        );

        links
    }

    /// Resolve an href to an absolute URL against `base_url`
    pub fn resolve_url(href: &str, base_url: &str) -> ParsingResult<String> {
        let base_url = base_url.trim_end_matches('/');

        let resolved_url = if href.starts_with("http://") || href.starts_with("https://") {
            href.to_string()
        } else if href.starts_with("//") {
            // Protocol-relative
            format!("https:{href}")
        } else if href.starts_with('/') {
            format!("{base_url}{href}")
        } else {
            format!("{base_url}/{href}")
        };

        if let Err(e) = Url::parse(&resolved_url) {
            return Err(ParsingError::url_resolution_failed(
                &resolved_url,
                &format!("Resolved URL is not valid: {e}"),
                Some(base_url),
            ));
        }

        Ok(resolved_url)
    }
}

impl ContextualParser for ProductListParser {
    type Output = Vec<String>;
    type Context = ParseContext;

    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> Self::Output {
        self.discover_links(html, context)
    }
}
