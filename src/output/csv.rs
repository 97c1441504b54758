//! Flat CSV companion to the JSON report
//!
//! One row per product. List and map fields are JSON-encoded into a single
//! cell so the file opens cleanly in a spreadsheet.

use crate::model::Product;
use crate::Result;
use csv::Writer;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// CSV record for one product
#[derive(Debug, Serialize)]
struct ProductRow<'a> {
    part_number: &'a str,
    sku: &'a str,
    name: &'a str,
    brand: &'a str,
    category: &'a str,
    subcategory: &'a str,
    price: &'a str,
    description: &'a str,
    features: String,
    specifications: String,
    url: &'a str,
    image_url: &'a str,
    scraped_at: String,
}

impl<'a> ProductRow<'a> {
    fn from_product(product: &'a Product) -> Result<Self> {
        let specifications: BTreeMap<_, _> = product.specifications.iter().collect();

        Ok(Self {
            part_number: &product.part_number,
            sku: product.sku.as_deref().unwrap_or_default(),
            name: &product.name,
            brand: product.brand.as_deref().unwrap_or_default(),
            category: &product.category,
            subcategory: product.subcategory.as_deref().unwrap_or_default(),
            price: product.price.as_deref().unwrap_or_default(),
            description: product.description.as_deref().unwrap_or_default(),
            features: serde_json::to_string(&product.features)?,
            specifications: serde_json::to_string(&specifications)?,
            url: &product.url,
            image_url: product.image_url.as_deref().unwrap_or_default(),
            scraped_at: product.scraped_at.to_rfc3339(),
        })
    }
}

/// Path of the CSV companion for a JSON report path
pub fn csv_path_for(json_path: &Path) -> PathBuf {
    json_path.with_extension("csv")
}

/// Writes `products` to `path`, one row each
///
/// Returns false without touching the filesystem when there are no products.
pub fn write_products_csv(products: &[Product], path: &Path) -> Result<bool> {
    if products.is_empty() {
        tracing::debug!("No products, skipping CSV output");
        return Ok(false);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = Writer::from_writer(BufWriter::new(File::create(path)?));
    for product in products {
        writer.serialize(ProductRow::from_product(product)?)?;
    }
    writer.flush()?;

    tracing::info!("Saved CSV to {}", path.display());
    Ok(true)
}
