//! HTML parsing infrastructure
//!
//! Trait-based parsers for the two page kinds the crawler reads: category pages
//! (link discovery) and product pages (field extraction). Both are driven by an
//! [`ExtractionProfile`](crate::domain::ExtractionProfile) and never fail on
//! missing elements.

pub mod context;
pub mod error;
pub mod fabric_extractor;
pub mod product_detail_parser;
pub mod product_list_parser;
pub mod selectors;

// Re-export public types
pub use context::{DetailParseContext, ParseContext};
pub use error::{ParsingError, ParsingResult};
pub use fabric_extractor::{FabricDetails, FabricExtractor, FabricSource};
pub use product_detail_parser::ProductDetailParser;
pub use product_list_parser::ProductListParser;

use scraper::Html;

/// Parser trait with context support
pub trait ContextualParser {
    type Output;
    type Context;

    /// Parse a document with contextual information
    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> Self::Output;

    /// Parse raw markup with contextual information
    fn parse_markup(&self, markup: &str, context: &Self::Context) -> Self::Output {
        let html = Html::parse_document(markup);
        self.parse_with_context(&html, context)
    }
}
