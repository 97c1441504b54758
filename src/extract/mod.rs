//! Product field extraction
//!
//! Every product attribute is recovered independently by its own cascade:
//! an ordered list of strategies evaluated left to right, where the first
//! strategy returning a value wins. A cascade that finds nothing leaves the
//! attribute at its default, so a page always yields a [`Product`].
//!
//! # Components
//!
//! - `metadata`: typed decoding of embedded JSON-LD product records
//! - `patterns`: labeled free-text patterns ("Part #:", "Brand:", prices)
//! - `fields`: strategy lists for the scalar attributes
//! - `details`: specifications and features, which merge several sources

mod details;
mod fields;
mod metadata;
mod patterns;

pub use details::{extract_features, extract_specifications};
pub use metadata::{decode_products, ProductMetadata};
pub use patterns::TextPatterns;

use crate::crawler::Document;
use crate::model::{Product, DEFAULT_PRODUCT_NAME, UNKNOWN_PART_NUMBER};
use chrono::Utc;

/// Longest description kept, in characters
pub const DESCRIPTION_MAX_CHARS: usize = 2000;

/// Descriptions must be longer than this to be accepted from markup
pub const DESCRIPTION_MIN_CHARS: usize = 10;

/// A product page prepared for extraction
///
/// The visible text and decoded metadata are computed once and shared by
/// every cascade.
pub struct ProductPage<'a> {
    pub document: &'a Document,
    pub text: String,
    pub metadata: Vec<ProductMetadata>,
}

impl<'a> ProductPage<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self {
            document,
            text: document.text(),
            metadata: decode_products(&document.json_ld_blocks()),
        }
    }

    /// First metadata record for which `f` yields a value
    pub fn from_metadata<T>(&self, f: impl Fn(&ProductMetadata) -> Option<T>) -> Option<T> {
        self.metadata.iter().find_map(f)
    }
}

/// One step of a cascade
pub type Strategy<T> = fn(&FieldExtractor, &ProductPage<'_>) -> Option<T>;

/// Builds [`Product`]s from product pages
#[derive(Debug, Clone, Default)]
pub struct FieldExtractor {
    patterns: TextPatterns,
}

impl FieldExtractor {
    pub fn new() -> Self {
        Self {
            patterns: TextPatterns::new(),
        }
    }

    pub(crate) fn patterns(&self) -> &TextPatterns {
        &self.patterns
    }

    /// Runs `strategies` in order and returns the first hit
    pub fn cascade<T>(&self, page: &ProductPage<'_>, strategies: &[Strategy<T>]) -> Option<T> {
        strategies.iter().find_map(|strategy| strategy(self, page))
    }

    /// Extracts a full product from `document`
    ///
    /// `url` is the reference URL the page was fetched for and becomes the
    /// product's identity. `category` and `subcategory` come from the
    /// traversal, never from the page.
    ///
    /// # Example
    ///
    /// ```
    /// use catalog_sweep::crawler::Document;
    /// use catalog_sweep::extract::FieldExtractor;
    /// use url::Url;
    ///
    /// let url = "https://example.com/parts/pad-1";
    /// let html = r#"<html><body><h1>Brake Pad</h1><p>Part #: PAD-1</p><p>$12.50</p></body></html>"#;
    /// let doc = Document::parse(Url::parse(url).unwrap(), html);
    ///
    /// let product = FieldExtractor::new().extract(&doc, url, "brakes", None);
    /// assert_eq!(product.name, "Brake Pad");
    /// assert_eq!(product.part_number, "PAD-1");
    /// assert_eq!(product.price.as_deref(), Some("$12.50"));
    /// ```
    pub fn extract(
        &self,
        document: &Document,
        url: &str,
        category: &str,
        subcategory: Option<&str>,
    ) -> Product {
        let page = ProductPage::new(document);

        let product = Product {
            name: self
                .cascade(&page, fields::NAME)
                .unwrap_or_else(|| DEFAULT_PRODUCT_NAME.to_string()),
            part_number: self
                .cascade(&page, fields::PART_NUMBER)
                .unwrap_or_else(|| UNKNOWN_PART_NUMBER.to_string()),
            sku: self.cascade(&page, fields::SKU),
            brand: self.cascade(&page, fields::BRAND),
            category: category.to_string(),
            subcategory: subcategory.map(str::to_string),
            price: self.cascade(&page, fields::PRICE),
            description: self.cascade(&page, fields::DESCRIPTION),
            features: extract_features(&page),
            specifications: extract_specifications(page.document),
            url: url.to_string(),
            image_url: self.cascade(&page, fields::IMAGE),
            scraped_at: Utc::now(),
        };

        tracing::info!(
            "Scraped: {} - {}",
            product.part_number,
            product.name.chars().take(50).collect::<String>()
        );
        product
    }
}

/// Cuts `text` to at most `max` characters
pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    const URL: &str = "https://shop.example.com/parts/hdvalue-brake-pad-hdv1601b";

    fn extract(html: &str) -> Product {
        let doc = Document::parse(Url::parse(URL).unwrap(), html);
        FieldExtractor::new().extract(&doc, URL, "brakes", Some("pads"))
    }

    #[test]
    fn test_full_product_page() {
        let product = extract(
            r#"<html><head><title>Brake Pad</title></head><body>
                <h1 class="product-name">HDVALUE Brake Pad Kit</h1>
                <div class="sub-text">Part #: HDV1601B|Brand: HDVALUE|MPN #: HDV1601B-M</div>
                <div class="your-price">Your Price: $1,234.56</div>
                <div class="product-description">Premium ceramic pads for heavy duty trucks.</div>
                <div class="product-image"><img src="/img/pad.jpg"></div>
                <ul class="product-features"><li>Low dust</li><li>Quiet</li></ul>
                <div class="specItem"><span class="specLabel">Axle:</span><span class="specValue">Front</span></div>
            </body></html>"#,
        );

        assert_eq!(product.name, "HDVALUE Brake Pad Kit");
        assert_eq!(product.part_number, "HDV1601B");
        assert_eq!(product.sku.as_deref(), Some("HDV1601B-M"));
        assert_eq!(product.brand.as_deref(), Some("HDVALUE"));
        assert_eq!(product.price.as_deref(), Some("$1,234.56"));
        assert_eq!(
            product.description.as_deref(),
            Some("Premium ceramic pads for heavy duty trucks.")
        );
        assert_eq!(
            product.image_url.as_deref(),
            Some("https://shop.example.com/img/pad.jpg")
        );
        assert_eq!(product.features, vec!["Low dust", "Quiet"]);
        assert_eq!(product.specifications.get("Axle").map(String::as_str), Some("Front"));
        assert_eq!(product.category, "brakes");
        assert_eq!(product.subcategory.as_deref(), Some("pads"));
        assert_eq!(product.url, URL);
    }

    #[test]
    fn test_metadata_only_page() {
        let product = extract(
            r#"<html><head><script type="application/ld+json">{
                "@type": "Product",
                "name": "Air Dryer Cartridge",
                "sku": "AD-9",
                "brand": {"name": "Bendix"},
                "description": "Replacement cartridge for AD-9 air dryers.",
                "offers": {"price": 88},
                "image": "https://cdn.example.com/ad9.jpg"
            }</script></head><body><div>Out of stock</div></body></html>"#,
        );

        assert_eq!(product.name, "Air Dryer Cartridge");
        assert_eq!(product.part_number, "AD-9");
        assert_eq!(product.sku.as_deref(), Some("AD-9"));
        assert_eq!(product.brand.as_deref(), Some("Bendix"));
        assert_eq!(product.price.as_deref(), Some("$88.00"));
        assert_eq!(
            product.description.as_deref(),
            Some("Replacement cartridge for AD-9 air dryers.")
        );
        assert_eq!(
            product.image_url.as_deref(),
            Some("https://cdn.example.com/ad9.jpg")
        );
    }

    #[test]
    fn test_metadata_with_image_objects_and_brand_list() {
        let product = extract(
            r#"<html><head><script type="application/ld+json">{
                "@type": "Product",
                "name": "Air Dryer",
                "sku": "AD-9",
                "brand": [{"@type": "Brand", "name": "Bendix"}],
                "offers": {"price": 88},
                "image": [{"@type": "ImageObject", "url": "https://cdn.example.com/ad9.jpg"}],
                "additionalProperty": null
            }</script></head><body><div>Out of stock</div></body></html>"#,
        );

        assert_eq!(product.name, "Air Dryer");
        assert_eq!(product.part_number, "AD-9");
        assert_eq!(product.brand.as_deref(), Some("Bendix"));
        assert_eq!(product.price.as_deref(), Some("$88.00"));
        assert_eq!(
            product.image_url.as_deref(),
            Some("https://cdn.example.com/ad9.jpg")
        );
    }

    #[test]
    fn test_higher_priority_strategy_wins_over_metadata() {
        let product = extract(
            r#"<html><head><script type="application/ld+json">
                {"@type": "Product", "name": "Metadata Name"}
            </script></head><body><h1>Heading Name</h1></body></html>"#,
        );
        assert_eq!(product.name, "Heading Name");
    }

    #[test]
    fn test_empty_page_uses_defaults() {
        let product = extract("<html><body></body></html>");

        assert_eq!(product.name, DEFAULT_PRODUCT_NAME);
        assert_eq!(product.part_number, UNKNOWN_PART_NUMBER);
        assert_eq!(product.sku, None);
        assert_eq!(product.brand, None);
        assert_eq!(product.price, None);
        assert_eq!(product.description, None);
        assert!(product.features.is_empty());
        assert!(product.specifications.is_empty());
        assert_eq!(product.image_url, None);
    }

    #[test]
    fn test_missing_name_does_not_block_other_fields() {
        let product = extract(
            r#"<html><body><p>Part #: ZX-12</p><p>$95</p></body></html>"#,
        );
        assert_eq!(product.name, DEFAULT_PRODUCT_NAME);
        assert_eq!(product.part_number, "ZX-12");
        assert_eq!(product.price.as_deref(), Some("$95"));
    }

    #[test]
    fn test_malformed_metadata_does_not_abort() {
        let product = extract(
            r#"<html><head><script type="application/ld+json">{ broken</script></head>
            <body><h1>Hub Seal</h1></body></html>"#,
        );
        assert_eq!(product.name, "Hub Seal");
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("ab", 10), "ab");
    }
}
