//! CSV and JSON export of result sets
//!
//! Both formats use the record's serde field names (`Brand`, `Product Name`,
//! ...) in declaration order. An empty result set writes nothing.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::config::ExportConfig;
use crate::domain::ResultSet;

/// Paths written by [`RecordExporter::export_all`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportedFiles {
    pub csv: Option<PathBuf>,
    pub json: Option<PathBuf>,
}

pub struct RecordExporter {
    output_dir: PathBuf,
    json_indent: usize,
}

impl RecordExporter {
    pub fn new(output_dir: impl Into<PathBuf>, json_indent: usize) -> Self {
        Self {
            output_dir: output_dir.into(),
            json_indent,
        }
    }

    pub fn from_config(config: &ExportConfig) -> Self {
        Self::new(config.output_dir.clone(), config.json_indent)
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write `<stem>.csv` and `<stem>.json`
    pub fn export_all(&self, results: &ResultSet, stem: &str) -> Result<ExportedFiles> {
        Ok(ExportedFiles {
            csv: self.export_csv(results, &format!("{stem}.csv"))?,
            json: self.export_json(results, &format!("{stem}.json"))?,
        })
    }

    /// Header row plus one row per record; `None` when there is nothing to write
    pub fn export_csv(&self, results: &ResultSet, file_name: &str) -> Result<Option<PathBuf>> {
        let Some(path) = self.target(results, file_name)? else {
            return Ok(None);
        };

        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("Failed to create CSV file {}", path.display()))?;
        for record in results {
            writer
                .serialize(record)
                .with_context(|| format!("Failed to write CSV row for {}", record.url))?;
        }
        writer.flush().context("Failed to flush CSV file")?;

        info!("✓ Exported {} products to {}", results.len(), path.display());
        Ok(Some(path))
    }

    /// Pretty-printed array of objects, non-ASCII kept as-is
    pub fn export_json(&self, results: &ResultSet, file_name: &str) -> Result<Option<PathBuf>> {
        let Some(path) = self.target(results, file_name)? else {
            return Ok(None);
        };

        let file = File::create(&path)
            .with_context(|| format!("Failed to create JSON file {}", path.display()))?;
        let mut writer = BufWriter::new(file);

        let indent = " ".repeat(self.json_indent);
        let formatter = PrettyFormatter::with_indent(indent.as_bytes());
        let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
        results
            .records()
            .serialize(&mut serializer)
            .context("Failed to serialize records to JSON")?;
        writer.flush().context("Failed to flush JSON file")?;

        info!("✓ Exported {} products to {}", results.len(), path.display());
        Ok(Some(path))
    }

    fn target(&self, results: &ResultSet, file_name: &str) -> Result<Option<PathBuf>> {
        if results.is_empty() {
            warn!("No results to export to {}", file_name);
            return Ok(None);
        }

        fs::create_dir_all(&self.output_dir).with_context(|| {
            format!("Failed to create output directory {}", self.output_dir.display())
        })?;
        Ok(Some(self.output_dir.join(file_name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProductRecord;
    use tempfile::TempDir;

    fn record(name: &str) -> ProductRecord {
        ProductRecord {
            brand: "BlissClub".to_string(),
            product_name: name.to_string(),
            price: "₹1,499".to_string(),
            fabric_details: "N/A".to_string(),
            description: "Soft, \"buttery\" feel".to_string(),
            url: format!("https://blissclub.com/products/{name}"),
            crawled_at: "2024-05-01 10:00:00".to_string(),
        }
    }

    #[test]
    fn test_empty_result_set_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let exporter = RecordExporter::new(dir.path(), 2);

        let files = exporter.export_all(&ResultSet::new(), "empty").unwrap();
        assert_eq!(files, ExportedFiles::default());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_csv_header_order() {
        let dir = TempDir::new().unwrap();
        let exporter = RecordExporter::new(dir.path(), 2);
        let results: ResultSet = vec![record("cloud-leggings")].into_iter().collect();

        let path = exporter.export_csv(&results, "out.csv").unwrap().unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        let header = content.lines().next().unwrap();
        assert_eq!(
            header,
            "Brand,Product Name,Price,Fabric Details,Description,URL,Crawled At"
        );
    }

    #[test]
    fn test_json_indent_and_unescaped_unicode() {
        let dir = TempDir::new().unwrap();
        let exporter = RecordExporter::new(dir.path().join("nested"), 4);
        let results: ResultSet = vec![record("a")].into_iter().collect();

        let path = exporter.export_json(&results, "out.json").unwrap().unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("₹1,499"));
        assert!(content.contains("\n        \"Brand\": \"BlissClub\""));
    }
}
