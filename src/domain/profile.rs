//! Per-site extraction profiles
//!
//! A profile is plain data: the generic crawler and parsers read everything
//! site-specific (selectors, keywords, category paths) from it.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::constants::fabric::DEFAULT_VOCABULARY;

/// Storefronts with a built-in profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Storefront {
    KicaActive,
    BlissClub,
    SilverTraq,
    TerraActive,
}

impl Storefront {
    pub const ALL: [Storefront; 4] = [
        Storefront::KicaActive,
        Storefront::BlissClub,
        Storefront::SilverTraq,
        Storefront::TerraActive,
    ];

    /// Brand label written to every record
    pub fn brand(self) -> &'static str {
        match self {
            Self::KicaActive => "Kica Active",
            Self::BlissClub => "BlissClub",
            Self::SilverTraq => "SilverTraq",
            Self::TerraActive => "Terra-active",
        }
    }

    /// Short lowercase identifier, used in output file names
    pub fn slug(self) -> &'static str {
        match self {
            Self::KicaActive => "kica",
            Self::BlissClub => "blissclub",
            Self::SilverTraq => "silvertraq",
            Self::TerraActive => "terractive",
        }
    }
}

impl fmt::Display for Storefront {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.brand())
    }
}

/// CSS selectors for product detail pages, each list in priority order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDetailSelectors {
    /// Product name headings
    pub name: Vec<String>,

    /// Price-indicating elements
    pub price: Vec<String>,

    /// Description containers; also the text searched by the regex fallback
    pub description: Vec<String>,

    /// Containers searched forward from a fabric keyword hit (list first, then generic)
    pub fabric_containers: Vec<String>,

    /// Accordion/tab panels
    pub accordion: Vec<String>,
}

impl Default for ProductDetailSelectors {
    fn default() -> Self {
        Self {
            name: vec!["h1".to_string()],
            price: vec!["span.price".to_string(), "span.money".to_string()],
            description: vec![
                "div[class*=\"description\"]".to_string(),
                "div[class*=\"Description\"]".to_string(),
            ],
            fabric_containers: vec!["ul".to_string(), "div".to_string()],
            accordion: vec![
                "div[class*=\"accordion\"]".to_string(),
                "div[class*=\"Accordion\"]".to_string(),
                "div[class*=\"tab\"]".to_string(),
                "div[class*=\"Tab\"]".to_string(),
            ],
        }
    }
}

/// Everything the crawler needs to know about one storefront
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionProfile {
    pub site: Storefront,

    /// Brand label; defaults to the storefront's
    pub brand: String,

    /// Scheme and host, without trailing slash
    pub base_url: String,

    /// Category path suffixes, crawled in order
    pub categories: Vec<String>,

    /// Href substring identifying product pages
    pub link_pattern: String,

    pub selectors: ProductDetailSelectors,

    /// Lowercase keywords that mark a fabric section heading
    pub fabric_keywords: Vec<String>,

    /// Materials recognized by the percentage regex fallback
    pub fabric_vocabulary: Vec<String>,

    /// Whether accordion/tab panels are searched before the regex fallback
    pub use_accordion_fallback: bool,
}

impl ExtractionProfile {
    pub fn new(site: Storefront, base_url: impl Into<String>) -> Self {
        Self {
            site,
            brand: site.brand().to_string(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            categories: Vec::new(),
            link_pattern: "/products/".to_string(),
            selectors: ProductDetailSelectors::default(),
            fabric_keywords: Vec::new(),
            fabric_vocabulary: DEFAULT_VOCABULARY.iter().map(|s| (*s).to_string()).collect(),
            use_accordion_fallback: false,
        }
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_fabric_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fabric_keywords = keywords
            .into_iter()
            .map(|k| k.into().to_lowercase())
            .collect();
        self
    }

    pub fn with_fabric_vocabulary<I, S>(mut self, vocabulary: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fabric_vocabulary = vocabulary
            .into_iter()
            .map(|k| k.into().to_lowercase())
            .collect();
        self
    }

    pub fn with_selectors(mut self, selectors: ProductDetailSelectors) -> Self {
        self.selectors = selectors;
        self
    }

    pub fn with_link_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.link_pattern = pattern.into();
        self
    }

    pub fn with_accordion_fallback(mut self, enabled: bool) -> Self {
        self.use_accordion_fallback = enabled;
        self
    }

    /// Absolute URL of a category path suffix
    pub fn category_url(&self, category: &str) -> String {
        if category.starts_with("http://") || category.starts_with("https://") {
            category.to_string()
        } else {
            format!("{}/{}", self.base_url, category.trim_start_matches('/'))
        }
    }

    pub fn category_urls(&self) -> Vec<String> {
        self.categories.iter().map(|c| self.category_url(c)).collect()
    }
}
