//! URL handling module for Catalog-Sweep
//!
//! This module provides link resolution against a page URL, the product-path
//! heuristic used on listing pages, category slug derivation and the
//! category selection rules applied to user filters.

mod category;
mod resolve;

// Re-export main functions
pub use category::{select_categories, slugify};
pub use resolve::{is_product_path, path_segment_count, resolve_link, PRODUCT_PATH_MARKER};
