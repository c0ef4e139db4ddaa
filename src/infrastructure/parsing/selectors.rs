//! Selector compilation shared by the parsers

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use super::{ParsingError, ParsingResult};

/// Compile selector strings for `field`, skipping the ones that fail
///
/// Fails only when the list is non-empty and nothing compiled.
pub fn compile_selectors(field: &str, selector_strings: &[String]) -> ParsingResult<Vec<Selector>> {
    let mut selectors = Vec::new();
    let mut errors = Vec::new();

    for selector_str in selector_strings {
        match Selector::parse(selector_str) {
            Ok(selector) => selectors.push(selector),
            Err(e) => {
                warn!("Failed to compile {} selector '{}': {}", field, selector_str, e);
                errors.push(format!("'{selector_str}': {e}"));
            }
        }
    }

    if selectors.is_empty() && !selector_strings.is_empty() {
        return Err(ParsingError::no_valid_selectors(field, errors));
    }

    if !errors.is_empty() {
        debug!("Some {} selectors failed to compile: {}", field, errors.join(", "));
    }

    Ok(selectors)
}

/// Compile a single selector that the parsers rely on
pub fn compile_one(selector_str: &str) -> ParsingResult<Selector> {
    Selector::parse(selector_str)
        .map_err(|e| ParsingError::invalid_selector(selector_str, &e.to_string()))
}

/// First element matching any selector, trying selectors in priority order
pub fn first_match<'a>(html: &'a Html, selectors: &[Selector]) -> Option<ElementRef<'a>> {
    selectors
        .iter()
        .find_map(|selector| html.select(selector).next())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_selectors_are_skipped() {
        let compiled = compile_selectors(
            "price",
            &["span.price".to_string(), "span[[".to_string()],
        )
        .unwrap();
        assert_eq!(compiled.len(), 1);
    }

    #[test]
    fn test_all_invalid_is_an_error() {
        let err = compile_selectors("price", &["span[[".to_string()]).unwrap_err();
        assert!(matches!(err, ParsingError::NoValidSelectors { .. }));
    }

    #[test]
    fn test_empty_list_is_allowed() {
        assert!(compile_selectors("accordion", &[]).unwrap().is_empty());
    }

    #[test]
    fn test_first_match_respects_priority() {
        let html = Html::parse_document(
            r#"<span class="money">$10</span><span class="price">$12</span>"#,
        );
        let selectors = compile_selectors(
            "price",
            &["span.price".to_string(), "span.money".to_string()],
        )
        .unwrap();
        let found = first_match(&html, &selectors).unwrap();
        assert_eq!(found.text().collect::<String>(), "$12");
    }
}
