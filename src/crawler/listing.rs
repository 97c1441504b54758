//! Category listing extraction
//!
//! This module finds product references on a category listing page:
//! - Product cards are located with an ordered list of container families;
//!   the first family with any match is used exclusively
//! - Without cards, product-path anchors are scanned directly and their
//!   nearest block-level ancestor stands in for the card
//! - Each card yields one reference (URL plus best-effort part number)

use crate::crawler::document::{attr, element_text, select_within, Document};
use crate::model::ProductReference;
use crate::url::{is_product_path, resolve_link, PRODUCT_PATH_MARKER};
use regex::Regex;
use scraper::ElementRef;
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

/// Product card container families, most specific first
pub const CONTAINER_SELECTORS: &[&str] = &[
    ".plp-card",
    "[class*=\"plp-card\"]",
    ".slds-card",
    ".product-item",
    ".product-card",
    ".product-tile",
    "[data-product]",
    ".product",
    ".item",
    ".search-result-item",
    ".catalog-item",
    ".product-grid-item",
    ".plp-product",
];

/// Link families inside a product card, most specific first
pub const LINK_SELECTORS: &[&str] = &[
    "a.link-title",
    ".link-title a",
    "a[href*=\"/parts/\"]",
    "a.product-link",
    "a[href*=\"/product/\"]",
    "a[href*=\"/p/\"]",
    "a[href*=\"/PD/\"]",
    ".product-title a",
    ".product-name a",
    "h2 a",
    "h3 a",
    "h4 a",
];

/// Elements inside a card that may show the part number
pub const PART_PREVIEW_SELECTORS: &[&str] = &[
    ".part-number",
    ".sku",
    "[data-part-number]",
    ".product-sku",
    ".item-number",
    ".product-id",
    "[data-sku]",
    "[data-product-id]",
    ".sub-text",
];

/// Pagination widgets whose links lead to further listing pages
pub const PAGINATION_LINK_SELECTORS: &[&str] = &[
    ".pagination a",
    ".slds-pagination a",
    ".pagination-list a",
    "[class*=\"pagination\"] a",
    "[class*=\"pager\"] a",
    "a[rel=\"next\"]",
    ".next-page a",
    ".next a",
    "a[aria-label*=\"next\"]",
    "a[aria-label*=\"Next\"]",
    "a[title*=\"next\"]",
    "a[title*=\"Next\"]",
    ".pager a",
    ".page-numbers a",
    "nav.pagination a",
    "[aria-label=\"pagination\"] a",
    ".page-link",
    ".paginator a",
    ".paging a",
    "a.page-number",
    "a[data-page]",
    ".page-item a",
];

/// Elements carrying page numbers in pagination widgets
const PAGE_NUMBER_SELECTOR: &str = "[data-page], .page-number, .pagination a, [class*=\"page\"] a";

static PAGE_COUNT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)Page\s+\d+\s+of\s+(\d+)",
        r"(?i)of\s+(\d+)\s+pages?",
        r"(?i)(\d+)\s+total\s+pages?",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("hardcoded regex pattern is valid"))
    .collect()
});

/// Block-level elements accepted as a pseudo-container for a bare link
const BLOCK_ANCESTORS: &[&str] = &["div", "article", "li", "section"];

/// Extracts product references from category listing pages
#[derive(Debug, Clone, Default)]
pub struct ListingExtractor;

impl ListingExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Returns the product references found on `document`
    ///
    /// References are returned in document order; duplicates across cards
    /// are left for the caller to merge away.
    pub fn extract(&self, document: &Document, category: &str) -> Vec<ProductReference> {
        let containers = self.find_containers(document);

        let references: Vec<ProductReference> = containers
            .iter()
            .filter_map(|container| self.reference_from_container(container, document.url(), category))
            .collect();

        tracing::info!(
            "Found {} products on page {}",
            references.len(),
            document.url()
        );
        references
    }

    /// Locates product cards, falling back to bare product links
    fn find_containers<'a>(&self, document: &'a Document) -> Vec<ElementRef<'a>> {
        for selector in CONTAINER_SELECTORS {
            let matches = document.select_all(selector);
            if !matches.is_empty() {
                tracing::debug!("Found products with selector: {}", selector);
                return matches;
            }
        }

        tracing::debug!("No product containers found, extracting from links directly");

        let mut containers = Vec::new();
        let mut seen_hrefs = HashSet::new();

        for link in document.select_all(&format!("a[href*=\"{}\"]", PRODUCT_PATH_MARKER)) {
            let Some(href) = attr(&link, "href") else {
                continue;
            };

            let deep_enough = resolve_link(href, document.url())
                .and_then(|absolute| Url::parse(&absolute).ok())
                .is_some_and(|url| is_product_path(&url));
            if !deep_enough || !seen_hrefs.insert(href.to_string()) {
                continue;
            }

            if let Some(parent) = nearest_block_ancestor(&link) {
                containers.push(parent);
            }
        }

        tracing::debug!(
            "Found {} products from direct link extraction",
            containers.len()
        );
        containers
    }

    /// Derives a reference from one product card
    fn reference_from_container(
        &self,
        container: &ElementRef<'_>,
        base_url: &Url,
        category: &str,
    ) -> Option<ProductReference> {
        let link = LINK_SELECTORS
            .iter()
            .find_map(|selector| select_within(container, selector))
            .or_else(|| select_within(container, "a[href]"))?;

        let href = attr(&link, "href")?;
        let absolute = resolve_link(href, base_url)?;
        let url = Url::parse(&absolute).ok()?;

        if !is_product_path(&url) {
            tracing::trace!("Skipping category-style link {}", absolute);
            return None;
        }

        Some(ProductReference {
            url: absolute,
            part_number_preview: part_number_preview(container),
            category: category.to_string(),
        })
    }
}

/// Best-effort part number shown on a listing card
///
/// The first matching preview element decides: its text, else its
/// part-number data attributes. Without one, the card's own data
/// attributes are checked.
fn part_number_preview(container: &ElementRef<'_>) -> Option<String> {
    let from_element = PART_PREVIEW_SELECTORS
        .iter()
        .find_map(|selector| select_within(container, selector))
        .and_then(|element| {
            let text = element_text(&element);
            if !text.is_empty() {
                return Some(text);
            }
            attr(&element, "data-part-number")
                .or_else(|| attr(&element, "data-sku"))
                .map(str::to_string)
        });

    from_element.or_else(|| {
        ["data-part-number", "data-sku", "data-product-id"]
            .iter()
            .find_map(|name| attr(container, name))
            .map(str::to_string)
    })
}

/// Nearest div/article/li/section enclosing `element`
fn nearest_block_ancestor<'a>(element: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| BLOCK_ANCESTORS.contains(&ancestor.value().name()))
}

/// Best guess at the number of listing pages in a category
///
/// Looks for "Page X of N" style text first, then for the highest page
/// number shown in pagination widgets. Returns 1 when nothing is found.
pub fn detect_total_pages(document: &Document) -> u32 {
    let text = document.text();
    for pattern in PAGE_COUNT_PATTERNS.iter() {
        if let Some(total) = pattern
            .captures(&text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok())
        {
            return total;
        }
    }

    document
        .select_all(PAGE_NUMBER_SELECTOR)
        .iter()
        .flat_map(|element| {
            let from_attr = attr(element, "data-page").and_then(|v| v.parse::<u32>().ok());
            let from_text = element_text(element).parse::<u32>().ok();
            from_attr.into_iter().chain(from_text)
        })
        .max()
        .unwrap_or(1)
}

/// Absolute URLs of listing pages linked from pagination widgets
///
/// Placeholder hrefs (`#`, `javascript:` and the like) are dropped and each
/// URL appears once, in the order first seen.
pub fn pagination_links(document: &Document) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for selector in PAGINATION_LINK_SELECTORS {
        for link in document.select_all(selector) {
            let Some(absolute) = attr(&link, "href").and_then(|href| resolve_link(href, document.url()))
            else {
                continue;
            };
            if seen.insert(absolute.clone()) {
                links.push(absolute);
            }
        }
    }

    links
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(html: &str) -> Document {
        Document::parse(
            Url::parse("https://shop.example.com/parts/brakes-wheel-end").unwrap(),
            html,
        )
    }

    fn urls(references: &[ProductReference]) -> Vec<&str> {
        references.iter().map(|r| r.url.as_str()).collect()
    }

    #[test]
    fn test_extract_from_plp_cards() {
        let d = doc(r#"
            <div class="plp-card" data-sku="HDV1601B">
                <a class="link-title" href="/parts/hdvalue-brake-pad-hdv1601b">Brake Pad</a>
            </div>
            <div class="plp-card">
                <a class="link-title" href="/parts/bendix-caliper-k123">Caliper</a>
                <span class="sub-text">K123</span>
            </div>
        "#);

        let refs = ListingExtractor::new().extract(&d, "brakes");
        assert_eq!(
            urls(&refs),
            vec![
                "https://shop.example.com/parts/hdvalue-brake-pad-hdv1601b",
                "https://shop.example.com/parts/bendix-caliper-k123",
            ]
        );
        assert_eq!(refs[0].part_number_preview.as_deref(), Some("HDV1601B"));
        assert_eq!(refs[1].part_number_preview.as_deref(), Some("K123"));
        assert_eq!(refs[0].category, "brakes");
    }

    #[test]
    fn test_first_container_family_wins() {
        let d = doc(r#"
            <div class="product-card"><a href="/parts/a-1">A</a></div>
            <div class="product"><a href="/parts/b-2">B</a></div>
        "#);

        let refs = ListingExtractor::new().extract(&d, "brakes");
        assert_eq!(urls(&refs), vec!["https://shop.example.com/parts/a-1"]);
    }

    #[test]
    fn test_fallback_to_bare_links() {
        let d = doc(r#"
            <ul>
                <li><a href="/parts/a-1">A</a></li>
                <li><a href="/parts/a-1">A again</a></li>
                <li><a href="/parts">All parts</a></li>
                <li><a href="/parts/b-2">B</a></li>
            </ul>
        "#);

        let refs = ListingExtractor::new().extract(&d, "brakes");
        assert_eq!(
            urls(&refs),
            vec![
                "https://shop.example.com/parts/a-1",
                "https://shop.example.com/parts/b-2",
            ]
        );
    }

    #[test]
    fn test_skips_category_style_links() {
        let d = doc(r#"
            <div class="product-card"><a href="/parts/">Back to parts</a></div>
            <div class="product-card"><a href="/parts/x-9">X</a></div>
        "#);

        let refs = ListingExtractor::new().extract(&d, "brakes");
        assert_eq!(urls(&refs), vec!["https://shop.example.com/parts/x-9"]);
    }

    #[test]
    fn test_card_without_link_is_skipped() {
        let d = doc(r#"<div class="product-card"><span>No link</span></div>"#);
        assert!(ListingExtractor::new().extract(&d, "brakes").is_empty());
    }

    #[test]
    fn test_any_anchor_fallback_inside_card() {
        let d = doc(r#"<div class="product-tile"><a href="/catalog/item-5">Item</a></div>"#);
        let refs = ListingExtractor::new().extract(&d, "brakes");
        assert_eq!(urls(&refs), vec!["https://shop.example.com/catalog/item-5"]);
    }

    #[test]
    fn test_preview_from_data_attribute_on_element() {
        let d = doc(r#"
            <div class="product-card">
                <a href="/parts/y-1">Y</a>
                <span class="part-number" data-part-number="Y-1"></span>
            </div>
        "#);
        let refs = ListingExtractor::new().extract(&d, "brakes");
        assert_eq!(refs[0].part_number_preview.as_deref(), Some("Y-1"));
    }

    #[test]
    fn test_detect_total_pages_from_text() {
        let d = doc("<html><body><p>Page 1 of 12</p></body></html>");
        assert_eq!(detect_total_pages(&d), 12);

        let d = doc("<html><body><p>Showing 1 - 24 of 7 pages</p></body></html>");
        assert_eq!(detect_total_pages(&d), 7);
    }

    #[test]
    fn test_detect_total_pages_from_links() {
        let d = doc(r#"
            <div class="pagination">
                <a href="?page=1">1</a><a href="?page=2">2</a>
                <a href="?page=5" data-page="5">Last</a>
            </div>
        "#);
        assert_eq!(detect_total_pages(&d), 5);
    }

    #[test]
    fn test_detect_total_pages_defaults_to_one() {
        let d = doc("<html><body><p>No paging here</p></body></html>");
        assert_eq!(detect_total_pages(&d), 1);
    }

    #[test]
    fn test_pagination_links() {
        let d = doc(r##"
            <nav class="pagination">
                <a href="#">Prev</a>
                <a href="?page=2">2</a>
                <a href="javascript:void(0)">...</a>
                <a href="?page=3">3</a>
                <a rel="next" href="?page=2">Next</a>
            </nav>
        "##);
        assert_eq!(
            pagination_links(&d),
            vec![
                "https://shop.example.com/parts/brakes-wheel-end?page=2",
                "https://shop.example.com/parts/brakes-wheel-end?page=3",
            ]
        );
    }
}
