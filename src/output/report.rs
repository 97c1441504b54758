//! JSON crawl report
//!
//! The report is the primary output of a run: every extracted product plus
//! every per-URL error, written as pretty-printed JSON.

use crate::model::{ErrorRecord, Product};
use crate::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Final result of a crawl run
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub scraped_at: DateTime<Utc>,
    pub total_products: usize,
    pub categories_scraped: Vec<String>,
    pub products: Vec<Product>,
    pub errors: Vec<ErrorRecord>,
}

impl CrawlReport {
    /// Builds a report stamped with the current time
    ///
    /// `categories_scraped` lists the distinct categories of the products,
    /// sorted.
    pub fn new(products: Vec<Product>, errors: Vec<ErrorRecord>) -> Self {
        let categories_scraped = products
            .iter()
            .map(|product| product.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        Self {
            scraped_at: Utc::now(),
            total_products: products.len(),
            categories_scraped,
            products,
            errors,
        }
    }
}

/// Writes `report` as pretty-printed JSON to `path`
///
/// Missing parent directories are created.
pub fn write_json_report(report: &CrawlReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    tracing::info!(
        "Saved {} products to {}",
        report.total_products,
        path.display()
    );
    Ok(())
}
