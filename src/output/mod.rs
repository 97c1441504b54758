//! Output module for crawl results
//!
//! This module handles:
//! - Writing the JSON report (products, errors, categories)
//! - Writing the flat CSV companion next to it
//! - Printing the end-of-run summary

pub mod csv;
mod report;
pub mod stats;

pub use self::csv::{csv_path_for, write_products_csv};
pub use report::{write_json_report, CrawlReport};
pub use stats::print_summary;

use crate::Result;
use std::path::{Path, PathBuf};

/// Where a run's outputs ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub json: PathBuf,
    pub csv: Option<PathBuf>,
}

/// Writes the JSON report and, when there are products, the CSV companion
///
/// # Arguments
///
/// * `report` - The finished crawl report
/// * `json_path` - Destination of the JSON report
///
/// # Returns
///
/// * `Ok(OutputPaths)` - The files that were written
/// * `Err(SweepError)` - A file could not be written
pub fn write_outputs(report: &CrawlReport, json_path: &Path) -> Result<OutputPaths> {
    write_json_report(report, json_path)?;

    let csv_path = csv_path_for(json_path);
    let csv = write_products_csv(&report.products, &csv_path)?.then_some(csv_path);

    Ok(OutputPaths {
        json: json_path.to_path_buf(),
        csv,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_outputs_without_products_skips_csv() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("products.json");

        let paths = write_outputs(&CrawlReport::new(Vec::new(), Vec::new()), &json_path).unwrap();

        assert!(json_path.exists());
        assert_eq!(paths.csv, None);
        assert!(!dir.path().join("products.csv").exists());
    }
}
