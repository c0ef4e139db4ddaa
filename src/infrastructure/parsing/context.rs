//! Parsing contexts
//!
//! Per-page information the parsers need besides the document itself.

use chrono::Local;
use url::Url;

use super::{ParsingError, ParsingResult};
use crate::domain::ExtractionProfile;
use crate::domain::constants::record::CRAWLED_AT_FORMAT;

/// Context for category (listing) pages
#[derive(Debug, Clone)]
pub struct ParseContext {
    /// Scheme and host used to absolutize relative hrefs
    pub base_url: String,

    /// Href substring identifying product pages
    pub link_pattern: String,

    /// Category page being parsed, for logging
    pub page_url: Option<String>,
}

impl ParseContext {
    pub fn new(base_url: impl Into<String>, link_pattern: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            link_pattern: link_pattern.into(),
            page_url: None,
        }
    }

    pub fn for_profile(profile: &ExtractionProfile) -> Self {
        Self::new(profile.base_url.clone(), profile.link_pattern.clone())
    }

    /// Like [`Self::for_profile`], rejecting an unusable base URL or an empty link pattern
    pub fn try_for_profile(profile: &ExtractionProfile) -> ParsingResult<Self> {
        if profile.link_pattern.trim().is_empty() {
            return Err(ParsingError::configuration("link_pattern", "must not be empty"));
        }
        match Url::parse(&profile.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(Self::for_profile(profile)),
            Ok(url) => Err(ParsingError::configuration(
                "base_url",
                &format!("unsupported scheme '{}'", url.scheme()),
            )),
            Err(e) => Err(ParsingError::configuration("base_url", &e.to_string())),
        }
    }

    pub fn with_page_url(mut self, url: impl Into<String>) -> Self {
        self.page_url = Some(url.into());
        self
    }
}

/// Context for product detail pages
#[derive(Debug, Clone)]
pub struct DetailParseContext {
    /// Product URL being parsed
    pub url: String,

    /// Brand label copied into the record
    pub brand: String,

    /// Capture timestamp copied into the record
    pub crawled_at: String,
}

impl DetailParseContext {
    /// Context stamped with the current local time
    pub fn new(url: impl Into<String>, brand: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            brand: brand.into(),
            crawled_at: Local::now().format(CRAWLED_AT_FORMAT).to_string(),
        }
    }

    pub fn with_crawled_at(mut self, crawled_at: impl Into<String>) -> Self {
        self.crawled_at = crawled_at.into();
        self
    }
}
