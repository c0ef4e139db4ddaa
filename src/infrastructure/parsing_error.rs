//! Parsing error types
//!
//! Missing page elements are not errors (they become `N/A` fields); these
//! variants cover profile problems found while compiling selectors and
//! patterns, and URL normalization failures during link discovery.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParsingError {
    #[error("Invalid CSS selector: {selector} - {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("No valid selectors for field '{field}': {}", errors.join(", "))]
    NoValidSelectors { field: String, errors: Vec<String> },

    #[error("Invalid extraction pattern: {pattern} - {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("URL resolution failed: {url} - {reason}")]
    UrlResolutionFailed {
        url: String,
        reason: String,
        base_url: Option<String>,
    },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String, field: String },
}

impl ParsingError {
    /// Create an invalid selector error
    pub fn invalid_selector(selector: &str, reason: &str) -> Self {
        Self::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a no valid selectors error with the individual compile errors
    pub fn no_valid_selectors(field: &str, errors: Vec<String>) -> Self {
        Self::NoValidSelectors {
            field: field.to_string(),
            errors,
        }
    }

    /// Create an invalid pattern error
    pub fn invalid_pattern(pattern: &str, reason: &str) -> Self {
        Self::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a URL resolution error
    pub fn url_resolution_failed(url: &str, reason: &str, base_url: Option<&str>) -> Self {
        Self::UrlResolutionFailed {
            url: url.to_string(),
            reason: reason.to_string(),
            base_url: base_url.map(ToString::to_string),
        }
    }

    /// Create a configuration error for a profile field
    pub fn configuration(field: &str, message: &str) -> Self {
        Self::ConfigurationError {
            message: message.to_string(),
            field: field.to_string(),
        }
    }
}

pub type ParsingResult<T> = Result<T, ParsingError>;
