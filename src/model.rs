//! Catalog records produced and consumed by the crawl
//!
//! - `Product`: a fully resolved product page
//! - `ProductReference`: a pointer found on a category listing
//! - `ErrorRecord`: a per-URL failure surfaced in the final report
//! - `CategoryMap`: category slug to listing URL

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Name used when no extraction strategy recovers a product name
pub const DEFAULT_PRODUCT_NAME: &str = "Unknown Product";

/// Part number used when no extraction strategy recovers one
pub const UNKNOWN_PART_NUMBER: &str = "UNKNOWN";

/// A fully resolved catalog entry
///
/// Created once per successful product-page extraction and never mutated
/// afterwards. `url` identifies the product within a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub name: String,
    pub part_number: String,
    pub sku: Option<String>,
    pub brand: Option<String>,
    pub category: String,
    pub subcategory: Option<String>,
    pub price: Option<String>,
    pub description: Option<String>,
    pub features: Vec<String>,
    pub specifications: HashMap<String, String>,
    pub url: String,
    pub image_url: Option<String>,
    pub scraped_at: DateTime<Utc>,
}

/// A product link discovered on a category listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductReference {
    /// Absolute product page URL
    pub url: String,

    /// Part number visible on the listing card, if any
    pub part_number_preview: Option<String>,

    /// Category slug assigned by the caller
    pub category: String,
}

/// A failure tied to a single URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorRecord {
    pub url: String,
    pub error: String,
}

impl ErrorRecord {
    pub fn new(url: impl Into<String>, error: impl ToString) -> Self {
        Self {
            url: url.into(),
            error: error.to_string(),
        }
    }
}

/// Category slug to absolute listing URL
///
/// Ordered by slug so category iteration is deterministic.
pub type CategoryMap = BTreeMap<String, String>;
