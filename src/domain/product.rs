use serde::{Deserialize, Serialize};

use super::constants::record::NOT_FOUND;

/// One extracted product, as written to CSV/JSON
///
/// Price and fabric details are opaque display strings. Every field holds either
/// extracted text or [`NOT_FOUND`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(rename = "Brand")]
    pub brand: String,
    #[serde(rename = "Product Name")]
    pub product_name: String,
    #[serde(rename = "Price")]
    pub price: String,
    #[serde(rename = "Fabric Details")]
    pub fabric_details: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "URL")]
    pub url: String,
    #[serde(rename = "Crawled At")]
    pub crawled_at: String,
}

impl ProductRecord {
    /// Field values in export order
    pub fn fields(&self) -> [&str; 7] {
        [
            &self.brand,
            &self.product_name,
            &self.price,
            &self.fabric_details,
            &self.description,
            &self.url,
            &self.crawled_at,
        ]
    }

    pub fn has_fabric_details(&self) -> bool {
        self.fabric_details != NOT_FOUND
    }
}

/// Append-only, ordered collection of records for one crawl run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    records: Vec<ProductRecord>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: ProductRecord) {
        self.records.push(record);
    }

    /// Move every record of `other` to the end of this set, keeping order
    pub fn append(&mut self, other: ResultSet) {
        self.records.extend(other.records);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ProductRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProductRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a ProductRecord;
    type IntoIter = std::slice::Iter<'a, ProductRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl FromIterator<ProductRecord> for ResultSet {
    fn from_iter<I: IntoIterator<Item = ProductRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}
