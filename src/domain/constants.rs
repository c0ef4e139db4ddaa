//! Extraction and record constants
//!
//! Fixed values shared by the extractors, the exporter and the tests.

/// Record field constants
pub mod record {
    /// Value stored in any field that could not be extracted
    pub const NOT_FOUND: &str = "N/A";

    /// Maximum description length in characters, applied after trimming
    pub const DESCRIPTION_MAX_CHARS: usize = 200;

    /// `Crawled At` timestamp format (local time)
    pub const CRAWLED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    /// Output column names, in export order
    pub const FIELD_NAMES: [&str; 7] = [
        "Brand",
        "Product Name",
        "Price",
        "Fabric Details",
        "Description",
        "URL",
        "Crawled At",
    ];
}

/// Fabric extraction constants
pub mod fabric {
    /// Separator used when joining the text fragments of a fabric section
    pub const FRAGMENT_SEPARATOR: &str = " | ";

    /// Materials recognized by the percentage regex fallback
    pub const DEFAULT_VOCABULARY: &[&str] = &["cotton", "polyester", "nylon", "spandex", "elastane"];

    /// Keyword that marks an accordion/tab panel as fabric-related
    pub const ACCORDION_MARKER: &str = "fabric";
}
