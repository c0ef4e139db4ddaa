//! Fabric details extraction
//!
//! Fabric composition has no predictable location across storefronts, so the
//! extractor walks a fallback chain and stops at the first strategy that yields
//! non-empty text:
//!
//! 1. keyword section: the first text node containing a profile keyword; from
//!    its parent element, the next list (then generic container) in document
//!    order, fragments joined with `" | "`
//! 2. accordion/tab panel whose text mentions fabric (profiles that enable it)
//! 3. percentage pattern over the description text, e.g. `"79% Nylon, 21% Spandex"`
//!
//! When every strategy fails the field is `N/A`.

use regex::{Regex, RegexBuilder};
use scraper::{ElementRef, Html, Node, Selector};
use tracing::debug;

use super::selectors::compile_selectors;
use super::{ParsingError, ParsingResult};
use crate::domain::ExtractionProfile;
use crate::domain::constants::fabric::{ACCORDION_MARKER, FRAGMENT_SEPARATOR};
use crate::domain::constants::record::NOT_FOUND;
use crate::utils::joined_text;

/// Elements whose text is never treated as page content
const NON_CONTENT_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Which strategy produced the fabric details
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FabricSource {
    KeywordSection,
    Accordion,
    DescriptionPattern,
    NotFound,
}

/// Result of the fallback chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FabricDetails {
    pub text: String,
    pub source: FabricSource,
}

impl FabricDetails {
    fn not_found() -> Self {
        Self {
            text: NOT_FOUND.to_string(),
            source: FabricSource::NotFound,
        }
    }
}

pub struct FabricExtractor {
    keywords: Vec<String>,
    container_selectors: Vec<Selector>,
    accordion_selectors: Vec<Selector>,
    percentage_pattern: Option<Regex>,
}

impl FabricExtractor {
    pub fn from_profile(profile: &ExtractionProfile) -> ParsingResult<Self> {
        let accordion_selectors = if profile.use_accordion_fallback {
            compile_selectors("accordion", &profile.selectors.accordion)?
        } else {
            Vec::new()
        };

        Ok(Self {
            keywords: profile
                .fabric_keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            container_selectors: compile_selectors(
                "fabric_containers",
                &profile.selectors.fabric_containers,
            )?,
            accordion_selectors,
            percentage_pattern: Self::build_percentage_pattern(&profile.fabric_vocabulary)?,
        })
    }

    /// Case-insensitive `<digits>% ... <material> ...` up to a period or newline
    ///
    /// Returns `None` for an empty vocabulary, which disables the pattern step.
    pub fn build_percentage_pattern(vocabulary: &[String]) -> ParsingResult<Option<Regex>> {
        let materials: Vec<String> = vocabulary
            .iter()
            .map(|m| m.trim())
            .filter(|m| !m.is_empty())
            .map(regex::escape)
            .collect();

        if materials.is_empty() {
            return Ok(None);
        }

        let pattern = format!(r"(\d+%.*?(?:{}).*?)(?:\.|\n)", materials.join("|"));
        RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .map(Some)
            .map_err(|e| ParsingError::invalid_pattern(&pattern, &e.to_string()))
    }

    /// Run the fallback chain
    ///
    /// `description_text` is the raw text of the description container, if the
    /// page has one.
    pub fn extract(&self, html: &Html, description_text: Option<&str>) -> FabricDetails {
        if let Some(text) = self.from_keyword_section(html) {
            debug!("Fabric details found via keyword section");
            return FabricDetails {
                text,
                source: FabricSource::KeywordSection,
            };
        }

        if let Some(text) = self.from_accordion(html) {
            debug!("Fabric details found via accordion/tab panel");
            return FabricDetails {
                text,
                source: FabricSource::Accordion,
            };
        }

        if let Some(text) = description_text.and_then(|d| self.from_description(d)) {
            debug!("Fabric details found via description pattern");
            return FabricDetails {
                text,
                source: FabricSource::DescriptionPattern,
            };
        }

        debug!("No fabric details found");
        FabricDetails::not_found()
    }

    /// Strategy 1: keyword hit, then the next container in document order
    pub fn from_keyword_section(&self, html: &Html) -> Option<String> {
        if self.keywords.is_empty() {
            return None;
        }

        let anchor = self.find_keyword_parent(html)?;

        // List containers take priority over generic ones, so each selector
        // gets its own forward scan.
        self.container_selectors
            .iter()
            .find_map(|selector| Self::next_matching_after(html, anchor, selector))
            .map(|container| joined_text(&container, FRAGMENT_SEPARATOR))
            .filter(|text| !text.is_empty())
    }

    /// Strategy 2: first accordion/tab panel (document order) mentioning fabric
    pub fn from_accordion(&self, html: &Html) -> Option<String> {
        if self.accordion_selectors.is_empty() {
            return None;
        }

        html.root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|element| self.accordion_selectors.iter().any(|s| s.matches(element)))
            .find(|element| {
                element
                    .text()
                    .collect::<String>()
                    .to_lowercase()
                    .contains(ACCORDION_MARKER)
            })
            .map(|element| joined_text(&element, FRAGMENT_SEPARATOR))
            .filter(|text| !text.is_empty())
    }

    /// Strategy 3: percentage pattern over free text
    pub fn from_description(&self, text: &str) -> Option<String> {
        let pattern = self.percentage_pattern.as_ref()?;
        pattern
            .captures(text)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// Parent element of the first content text node containing a keyword
    fn find_keyword_parent<'a>(&self, html: &'a Html) -> Option<ElementRef<'a>> {
        html.tree.root().descendants().find_map(|node| {
            let Node::Text(text) = node.value() else {
                return None;
            };
            let parent = node.parent().and_then(ElementRef::wrap)?;
            if NON_CONTENT_ELEMENTS.contains(&parent.value().name()) {
                return None;
            }

            let lowered = text.to_lowercase();
            self.keywords
                .iter()
                .any(|keyword| lowered.contains(keyword.as_str()))
                .then_some(parent)
        })
    }

    /// First element after `anchor` in document order matching `selector`
    ///
    /// "After" starts right past the anchor's start tag, so the anchor's own
    /// descendants count.
    fn next_matching_after<'a>(
        html: &'a Html,
        anchor: ElementRef<'a>,
        selector: &Selector,
    ) -> Option<ElementRef<'a>> {
        html.tree
            .root()
            .descendants()
            .skip_while(|node| node.id() != anchor.id())
            .skip(1)
            .filter_map(ElementRef::wrap)
            .find(|element| selector.matches(element))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Storefront;

    fn extractor(accordion: bool) -> FabricExtractor {
        let profile = ExtractionProfile::new(Storefront::KicaActive, "https://kicaactive.com")
            .with_fabric_keywords(["fabric", "material"])
            .with_accordion_fallback(accordion);
        FabricExtractor::from_profile(&profile).unwrap()
    }

    #[test]
    fn test_keyword_heading_followed_by_list() {
        let html = Html::parse_document(
            r#"<div><h3>Fabric &amp; Care</h3>
               <ul><li> 79% Nylon </li><li>21% Spandex</li></ul></div>"#,
        );
        let details = extractor(false).extract(&html, None);
        assert_eq!(details.text, "79% Nylon | 21% Spandex");
        assert_eq!(details.source, FabricSource::KeywordSection);
    }

    #[test]
    fn test_keyword_match_is_case_insensitive() {
        let html = Html::parse_document(
            r#"<p>MATERIAL</p><ul><li>Recycled polyester</li></ul>"#,
        );
        assert_eq!(
            extractor(false).from_keyword_section(&html).as_deref(),
            Some("Recycled polyester")
        );
    }

    #[test]
    fn test_list_preferred_over_earlier_div() {
        let html = Html::parse_document(
            r#"<h4>Fabric</h4><div>Shipping info</div><ul><li>Cotton</li></ul>"#,
        );
        assert_eq!(extractor(false).from_keyword_section(&html).as_deref(), Some("Cotton"));
    }

    #[test]
    fn test_falls_back_to_generic_container() {
        let html = Html::parse_document(
            r#"<body><h4>Fabric</h4><div><span>Nylon</span> <span>Lycra</span></div></body>"#,
        );
        assert_eq!(
            extractor(false).from_keyword_section(&html).as_deref(),
            Some("Nylon | Lycra")
        );
    }

    #[test]
    fn test_keyword_in_script_is_ignored() {
        let html = Html::parse_document(
            r#"<script>var fabric = 1;</script><ul><li>Menu</li></ul>"#,
        );
        assert_eq!(extractor(false).from_keyword_section(&html), None);
    }

    #[test]
    fn test_accordion_fallback() {
        let html = Html::parse_document(
            r#"<div class="product-accordion">Size guide</div>
               <div class="product-accordion__item">Fabric: 80% Nylon, 20% Spandex</div>"#,
        );
        // Keyword extractor has no "fabric" heading followed by a container here,
        // so only the accordion strategy can succeed.
        let ex = extractor(true);
        assert_eq!(
            ex.from_accordion(&html).as_deref(),
            Some("Fabric: 80% Nylon, 20% Spandex")
        );
        assert_eq!(extractor(false).from_accordion(&html), None);
    }

    #[test]
    fn test_description_pattern() {
        let ex = extractor(false);
        assert_eq!(
            ex.from_description("Buttery soft. Made with 75% Nylon and 25% Spandex. Squat proof.")
                .as_deref(),
            Some("75% Nylon and 25% Spandex")
        );
        assert_eq!(
            ex.from_description("92% COTTON 8% elastane\nMachine wash").as_deref(),
            Some("92% COTTON 8% elastane")
        );
        assert_eq!(ex.from_description("100% recycled wool."), None);
        assert_eq!(ex.from_description("Made with nylon."), None);
    }

    #[test]
    fn test_configurable_vocabulary() {
        let pattern = FabricExtractor::build_percentage_pattern(&["viscose".to_string()])
            .unwrap()
            .unwrap();
        assert!(pattern.is_match("60% Viscose blend.\n"));
        assert!(FabricExtractor::build_percentage_pattern(&[]).unwrap().is_none());
    }

    #[test]
    fn test_nothing_found_is_sentinel() {
        let html = Html::parse_document("<h1>Leggings</h1>");
        let details = extractor(true).extract(&html, Some("Great for yoga."));
        assert_eq!(details.text, NOT_FOUND);
        assert_eq!(details.source, FabricSource::NotFound);
    }
}
