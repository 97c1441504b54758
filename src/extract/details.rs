//! Specifications and features
//!
//! Unlike the scalar attributes these merge several sources instead of
//! stopping at the first hit.

use super::ProductPage;
use crate::crawler::document::{element_text, select_all_within, select_within, Document};
use std::collections::{HashMap, HashSet};

const FEATURE_SELECTORS: &[&str] = &[
    ".product-features li",
    ".features-list li",
    ".benefits-list li",
    ".feature-list li",
    "[class*=\"feature\"] li",
    "[class*=\"benefit\"] li",
    ".product-highlights li",
    ".key-features li",
];

const DESCRIPTION_BULLET_SELECTOR: &str = ".product-description ul li, .description ul li";

const RICH_TEXT_BULLET_SELECTOR: &str = ".slds-rich-text-editor__output ul li";

/// Rich-text bullets at or above this length are prose, not features
const RICH_TEXT_MAX_CHARS: usize = 200;

const SPEC_TABLE_SELECTOR: &str = ".specifications table, .product-specs table, .spec-table, \
     .product-attributes table, .tech-specs table, #specifications table, .specsWrapper table";

const SPEC_LIST_SELECTOR: &str = ".specifications dl, .product-specs dl, .attributes dl";

const SPEC_BLOCK_SELECTOR: &str = ".spec-item, .attribute, .product-attribute, .spec-row, .attribute-row";

const SPEC_BLOCK_LABEL_SELECTOR: &str = ".label, .name, .key, .spec-name, .attr-name";

const SPEC_BLOCK_VALUE_SELECTOR: &str = ".value, .spec-value, .attr-value";

/// Ordered, deduplicated feature lines
struct FeatureList {
    items: Vec<String>,
    seen: HashSet<String>,
}

impl FeatureList {
    fn new() -> Self {
        Self {
            items: Vec::new(),
            seen: HashSet::new(),
        }
    }

    fn push(&mut self, text: String) {
        if text.chars().count() > 3 && self.seen.insert(text.clone()) {
            self.items.push(text);
        }
    }
}

/// Feature bullets from every known list family, then metadata properties
///
/// Lines of three characters or fewer are dropped; each line is kept once,
/// in the order first seen.
pub fn extract_features(page: &ProductPage<'_>) -> Vec<String> {
    let document = page.document;
    let mut features = FeatureList::new();

    for selector in FEATURE_SELECTORS {
        for item in document.select_all(selector) {
            features.push(element_text(&item));
        }
    }

    for item in document.select_all(DESCRIPTION_BULLET_SELECTOR) {
        features.push(element_text(&item));
    }

    for item in document.select_all(RICH_TEXT_BULLET_SELECTOR) {
        let text = element_text(&item);
        if text.chars().count() < RICH_TEXT_MAX_CHARS {
            features.push(text);
        }
    }

    for record in &page.metadata {
        for line in record.property_lines() {
            features.push(line);
        }
    }

    features.items
}

/// Label/value specification pairs
///
/// The catalog's own `specItem` blocks are used when present. Otherwise
/// specification tables, definition lists and generic label/value blocks
/// are merged, later duplicates overwriting earlier ones.
pub fn extract_specifications(document: &Document) -> HashMap<String, String> {
    let mut specs = HashMap::new();

    for item in document.select_all(".specItem") {
        let label = select_within(&item, ".specLabel");
        let value = select_within(&item, ".specValue");
        if let (Some(label), Some(value)) = (label, value) {
            insert_spec(&mut specs, &element_text(&label), element_text(&value));
        }
    }

    if !specs.is_empty() {
        return specs;
    }

    for table in document.select_all(SPEC_TABLE_SELECTOR) {
        for row in select_all_within(&table, "tr") {
            let cells = select_all_within(&row, "td, th");
            if let [key, value, ..] = cells.as_slice() {
                insert_spec(&mut specs, &element_text(key), element_text(value));
            }
        }
    }

    for list in document.select_all(SPEC_LIST_SELECTOR) {
        let terms = select_all_within(&list, "dt");
        let definitions = select_all_within(&list, "dd");
        for (term, definition) in terms.iter().zip(definitions.iter()) {
            insert_spec(&mut specs, &element_text(term), element_text(definition));
        }
    }

    for block in document.select_all(SPEC_BLOCK_SELECTOR) {
        let label = select_within(&block, SPEC_BLOCK_LABEL_SELECTOR);
        let value = select_within(&block, SPEC_BLOCK_VALUE_SELECTOR);
        if let (Some(label), Some(value)) = (label, value) {
            insert_spec(&mut specs, &element_text(&label), element_text(&value));
        }
    }

    specs
}

fn insert_spec(specs: &mut HashMap<String, String>, label: &str, value: String) {
    let key = label.trim_end_matches(':').trim();
    if !key.is_empty() && !value.is_empty() {
        specs.insert(key.to_string(), value);
    }
}
