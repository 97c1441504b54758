//! Free-text patterns matched against a product page's visible text
//!
//! The catalog renders identity fields as labeled text, for example
//! `Part #: HDV1601B|Brand: HDVALUE|MPN #: HDV1601B`, so several cascades
//! start with a labeled pattern before falling back to selectors.

use regex::Regex;

/// Compiled text patterns shared by the field cascades
#[derive(Debug, Clone)]
pub struct TextPatterns {
    part_label: Regex,
    part_generic: Vec<Regex>,
    part_prefix: Regex,
    mpn_label: Regex,
    sku_prefix: Regex,
    brand_label: Regex,
    currency: Regex,
    your_price: Regex,
    inline_price: Regex,
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("hardcoded regex pattern is valid")
}

impl TextPatterns {
    pub fn new() -> Self {
        Self {
            part_label: compile(r"(?i)Part\s*#:\s*([A-Z0-9\-]+)"),
            part_generic: vec![
                compile(r"(?i)Part\s*(?:Number|#|No\.?)[\s:]+([A-Z0-9\-]+)"),
                compile(r"(?i)SKU[\s:]+([A-Z0-9\-]+)"),
                compile(r"(?i)Item\s*(?:Number|#|No\.?)[\s:]+([A-Z0-9\-]+)"),
                compile(r"(?i)MPN[\s:]+([A-Z0-9\-]+)"),
            ],
            part_prefix: compile(r"(?i)^(Part\s*#?:?\s*|SKU:?\s*|Item\s*#?:?\s*|MPN:?\s*)"),
            mpn_label: compile(r"(?i)MPN\s*#?:\s*([A-Z0-9\-]+)"),
            sku_prefix: compile(r"(?i)^SKU:?\s*"),
            brand_label: compile(r"Brand:\s*([A-Za-z0-9\s]+?)(?:\||$|\n)"),
            currency: compile(r"\$(\d{1,3}(?:,\d{3})*(?:\.\d{2})?)"),
            your_price: compile(r"Your Price[:\s]*\$(\d+\.?\d*)"),
            inline_price: compile(r"\$[\d,]+\.?\d*"),
        }
    }

    /// `Part #: X` as the catalog prints it
    pub fn labeled_part_number(&self, text: &str) -> Option<String> {
        first_capture(&self.part_label, text)
    }

    /// "Part Number:", "SKU:", "Item #:" and "MPN:" labels, in that order
    pub fn generic_part_number(&self, text: &str) -> Option<String> {
        self.part_generic
            .iter()
            .find_map(|pattern| first_capture(pattern, text))
    }

    /// `MPN #: X`
    pub fn labeled_mpn(&self, text: &str) -> Option<String> {
        first_capture(&self.mpn_label, text)
    }

    /// `Brand: X` up to a pipe or line end
    pub fn labeled_brand(&self, text: &str) -> Option<String> {
        first_capture(&self.brand_label, text)
    }

    /// First `$` amount with optional thousands separators and cents
    pub fn currency_amount(&self, text: &str) -> Option<String> {
        first_capture(&self.currency, text).map(|amount| format!("${}", amount))
    }

    /// `Your Price: $X`
    pub fn your_price(&self, text: &str) -> Option<String> {
        first_capture(&self.your_price, text).map(|amount| format!("${}", amount))
    }

    /// A `$` amount inside a price element's text, returned as written
    pub fn inline_price(&self, text: &str) -> Option<String> {
        self.inline_price
            .find(text)
            .map(|m| m.as_str().to_string())
    }

    /// Strips a leading "Part #:", "SKU:", "Item #:" or "MPN:" label
    pub fn strip_part_prefix(&self, text: &str) -> String {
        self.part_prefix.replace(text, "").trim().to_string()
    }

    /// Strips a leading "SKU:" label
    pub fn strip_sku_prefix(&self, text: &str) -> String {
        self.sku_prefix.replace(text, "").trim().to_string()
    }
}

impl Default for TextPatterns {
    fn default() -> Self {
        Self::new()
    }
}

/// Trimmed first capture group, if it is non-empty
fn first_capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|value| !value.is_empty())
}
