//! Output module for writing harvest results
//!
//! This module handles:
//! - Deriving the raw/schema output filenames from the vendor identity
//! - Writing pretty-printed JSON arrays
//! - Printing the end-of-run report

use crate::url::VendorRef;
use crate::Result;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Summary of a completed harvest run
#[derive(Debug, Clone)]
pub struct HarvestReport {
    /// Total listing pages the site advertised
    pub total_pages: u32,
    /// Listing pages actually fetched (may be capped by --max-pages)
    pub pages_fetched: u32,
    /// Unique product URLs discovered on the listing
    pub urls_found: usize,
    /// Products successfully extracted and mapped
    pub products: usize,
    /// Per-product failures as (url, error message)
    pub failures: Vec<(String, String)>,
    /// Path of the raw extracted-records file
    pub raw_path: PathBuf,
    /// Path of the mapped target-schema file
    pub schema_path: PathBuf,
}

/// Builds the (raw, schema) output file paths for a vendor
///
/// Filenames follow `raw_<id>_<name>.json` / `schema_<id>_<name>.json`.
pub fn output_paths(directory: &str, vendor: &VendorRef) -> (PathBuf, PathBuf) {
    let dir = Path::new(directory);
    (
        dir.join(format!("raw_{}_{}.json", vendor.id, vendor.name)),
        dir.join(format!("schema_{}_{}.json", vendor.id, vendor.name)),
    )
}

/// Writes a slice of records as a pretty-printed JSON array
pub fn write_json_array<T: Serialize>(path: &Path, items: &[T]) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, items)?;
    Ok(())
}

/// Prints the end-of-run report to stdout
pub fn print_report(report: &HarvestReport) {
    println!("\nSaved files:");
    println!(" - {}          (raw extracted data)", report.raw_path.display());
    println!(" - {}   (catalog schema)", report.schema_path.display());

    println!(
        "\nPages: {}/{} fetched, {} product URLs, {} products written",
        report.pages_fetched, report.total_pages, report.urls_found, report.products
    );

    if !report.failures.is_empty() {
        println!(
            "\n{} pages had errors (first 10 shown):",
            report.failures.len()
        );
        for (url, message) in report.failures.iter().take(10) {
            println!(" - {} => {}", url, message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn test_output_paths() {
        let vendor = VendorRef {
            id: "61".to_string(),
            name: "Denta_Carts".to_string(),
        };
        let (raw, schema) = output_paths("./out", &vendor);

        assert_eq!(raw, Path::new("./out/raw_61_Denta_Carts.json"));
        assert_eq!(schema, Path::new("./out/schema_61_Denta_Carts.json"));
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Record {
        name: String,
        value: u32,
    }

    #[test]
    fn test_write_json_array_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");

        let records = vec![
            Record {
                name: "a".to_string(),
                value: 1,
            },
            Record {
                name: "b".to_string(),
                value: 2,
            },
        ];

        write_json_array(&path, &records).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        // Pretty-printed, one field per line
        assert!(content.contains("\n"));

        let parsed: Vec<Record> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed, records);
    }

    #[test]
    fn test_write_empty_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.json");

        write_json_array::<Record>(&path, &[]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim(), "[]");
    }
}
