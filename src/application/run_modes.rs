//! Run modes offered by the menu

use std::fmt;

use crate::domain::Storefront;
use crate::infrastructure::config::{ExportConfig, defaults};

/// What one invocation crawls
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    /// Every storefront, in menu order
    Full,
    /// A single storefront
    Single(Storefront),
    /// A user-picked subset, in menu order
    Custom(Vec<Storefront>),
}

impl RunMode {
    pub fn sites(&self) -> Vec<Storefront> {
        match self {
            Self::Full => Storefront::ALL.to_vec(),
            Self::Single(site) => vec![*site],
            Self::Custom(sites) => sites.clone(),
        }
    }

    /// Output file name without extension
    pub fn output_stem(&self, export: &ExportConfig) -> String {
        match self {
            Self::Full => export.full_run_stem.clone(),
            Self::Single(site) => format!("{}_products", site.slug()),
            Self::Custom(_) => defaults::CUSTOM_RUN_STEM.to_string(),
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => f.write_str("full crawl"),
            Self::Single(site) => write!(f, "{site} only"),
            Self::Custom(sites) => {
                let names: Vec<&str> = sites.iter().map(|s| s.slug()).collect();
                write!(f, "custom selection ({})", names.join(", "))
            }
        }
    }
}
