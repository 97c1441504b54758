//! End-of-run console summary

use crate::output::report::CrawlReport;
use std::collections::BTreeMap;
use std::path::Path;

/// Products per category, keyed by category slug
pub fn products_by_category(report: &CrawlReport) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();
    for product in &report.products {
        *counts.entry(product.category.as_str()).or_insert(0) += 1;
    }
    counts
}

/// Prints the run summary to stdout
///
/// # Arguments
///
/// * `report` - The finished crawl report
/// * `json_path` - Where the JSON report was written
/// * `csv_path` - Where the CSV companion was written, if it was
pub fn print_summary(report: &CrawlReport, json_path: &Path, csv_path: Option<&Path>) {
    println!();
    println!("{}", "=".repeat(50));
    println!("Scraping complete!");
    println!("Total products scraped: {}", report.total_products);

    let counts = products_by_category(report);
    if !counts.is_empty() {
        println!();
        println!("Products by category:");
        for (category, count) in counts {
            println!("  {}: {}", category, count);
        }
    }

    println!();
    println!("Output saved to: {}", json_path.display());
    if let Some(csv_path) = csv_path {
        println!("CSV saved to: {}", csv_path.display());
    }
    println!("Errors encountered: {}", report.errors.len());
    println!("{}", "=".repeat(50));
}
