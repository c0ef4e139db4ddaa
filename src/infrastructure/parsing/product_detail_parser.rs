//! Product detail parser
//!
//! Builds one [`ProductRecord`] per product page. Every field has a prioritized
//! selector list; a field that no selector yields is set to `N/A` instead of
//! failing the page, since missing markup is the common case across
//! independently designed storefronts.

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::context::DetailParseContext;
use super::fabric_extractor::{FabricDetails, FabricExtractor};
use super::selectors::{compile_selectors, first_match};
use super::{ContextualParser, ParsingResult};
use crate::domain::constants::record::{DESCRIPTION_MAX_CHARS, NOT_FOUND};
use crate::domain::{ExtractionProfile, ProductRecord};
use crate::utils::{joined_text, raw_text, truncate_chars};

/// Parser for extracting product records from product detail pages
pub struct ProductDetailParser {
    name_selectors: Vec<Selector>,
    price_selectors: Vec<Selector>,
    description_selectors: Vec<Selector>,
    fabric: FabricExtractor,
}

impl ProductDetailParser {
    /// Create a parser for one site profile
    pub fn with_profile(profile: &ExtractionProfile) -> ParsingResult<Self> {
        let selectors = &profile.selectors;
        Ok(Self {
            name_selectors: compile_selectors("name", &selectors.name)?,
            price_selectors: compile_selectors("price", &selectors.price)?,
            description_selectors: compile_selectors("description", &selectors.description)?,
            fabric: FabricExtractor::from_profile(profile)?,
        })
    }

    /// Extract the product record; never fails for missing elements
    pub fn extract_record(&self, html: &Html, context: &DetailParseContext) -> ProductRecord {
        debug!("Parsing product detail from: {}", context.url);

        let product_name = Self::first_text(html, "name", &self.name_selectors)
            .unwrap_or_else(|| NOT_FOUND.to_string());
        let price = Self::first_text(html, "price", &self.price_selectors)
            .unwrap_or_else(|| NOT_FOUND.to_string());

        let description_element = first_match(html, &self.description_selectors);
        let FabricDetails { text: fabric_details, .. } = self
            .fabric
            .extract(html, description_element.as_ref().map(raw_text).as_deref());
        let description = description_element
            .map(|element| Self::description_text(&element))
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| NOT_FOUND.to_string());

        ProductRecord {
            brand: context.brand.clone(),
            product_name,
            price,
            fabric_details,
            description,
            url: context.url.clone(),
            crawled_at: context.crawled_at.clone(),
        }
    }

    /// Fabric chain on its own, exposing which strategy matched
    pub fn extract_fabric(&self, html: &Html) -> FabricDetails {
        let description_element = first_match(html, &self.description_selectors);
        self.fabric
            .extract(html, description_element.as_ref().map(raw_text).as_deref())
    }

    /// Trimmed text of the first element (in selector priority order) with non-empty text
    fn first_text(html: &Html, field_name: &str, selectors: &[Selector]) -> Option<String> {
        for (i, selector) in selectors.iter().enumerate() {
            for element in html.select(selector) {
                let text = element.text().collect::<String>().trim().to_string();
                if !text.is_empty() {
                    debug!("Extracted {} using selector {}: {}", field_name, i, text);
                    return Some(text);
                }
            }
        }

        debug!("Failed to extract {} using {} selectors", field_name, selectors.len());
        None
    }

    /// Stripped fragments concatenated, then cut to the character budget
    fn description_text(element: &ElementRef<'_>) -> String {
        let text = joined_text(element, "");
        truncate_chars(text.trim(), DESCRIPTION_MAX_CHARS).to_string()
    }
}

impl ContextualParser for ProductDetailParser {
    type Output = ProductRecord;
    type Context = DetailParseContext;

    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> Self::Output {
        self.extract_record(html, context)
    }
}
