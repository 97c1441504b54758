//! Cascades for the scalar product attributes
//!
//! Each `pub(super) const` is the ordered strategy list for one attribute.
//! Strategies are plain functions so the priority order reads top to bottom.

use super::{truncate_chars, FieldExtractor, ProductPage, Strategy, DESCRIPTION_MAX_CHARS, DESCRIPTION_MIN_CHARS};
use crate::crawler::document::{attr, element_text, select_within};
use crate::url::resolve_link;

/// Part numbers and SKUs longer than this are page noise, not identifiers
const MAX_IDENTIFIER_CHARS: usize = 50;

pub(super) const NAME: &[Strategy<String>] = &[name_from_markup, name_from_metadata];

pub(super) const PART_NUMBER: &[Strategy<String>] = &[
    part_number_from_label,
    part_number_from_markup,
    part_number_from_container,
    part_number_from_metadata,
    part_number_from_generic_labels,
];

pub(super) const SKU: &[Strategy<String>] = &[sku_from_mpn_label, sku_from_markup, sku_from_metadata];

pub(super) const BRAND: &[Strategy<String>] =
    &[brand_from_label, brand_from_markup, brand_from_metadata];

pub(super) const PRICE: &[Strategy<String>] = &[
    price_from_currency_text,
    price_from_your_price,
    price_from_markup,
    price_from_metadata,
];

pub(super) const DESCRIPTION: &[Strategy<String>] =
    &[description_from_markup, description_from_metadata];

pub(super) const IMAGE: &[Strategy<String>] = &[image_from_markup, image_from_metadata];

const NAME_SELECTORS: &[&str] = &[
    "h1.product-name",
    "h1.product-title",
    "h1[itemprop=\"name\"]",
    "[itemprop=\"name\"]",
    ".product-name",
    ".product-title",
    "h1",
];

const PART_NUMBER_SELECTORS: &[&str] = &[
    ".part-number",
    ".product-part-number",
    "#part-number",
    "[data-part-number]",
    ".sku",
    ".product-sku",
    "[itemprop=\"sku\"]",
    "[itemprop=\"productID\"]",
    ".item-number",
    ".product-id",
    ".mpn",
    "[data-sku]",
    "[data-product-id]",
    "[data-mpn]",
];

const SKU_SELECTORS: &[&str] = &[
    ".sku:not(.part-number)",
    "[data-sku]",
    "[itemprop=\"sku\"]",
    ".manufacturer-sku",
];

const BRAND_SELECTORS: &[&str] = &[
    ".brand",
    ".manufacturer",
    "[itemprop=\"brand\"]",
    ".product-brand",
    "[data-brand]",
    ".brand-name",
    ".vendor",
    ".product-vendor",
];

const PRICE_SELECTORS: &[&str] = &[
    ".your-price",
    ".price",
    ".product-price",
    "[itemprop=\"price\"]",
    ".current-price",
    ".sale-price",
    "[data-price]",
    ".regular-price",
    ".special-price",
    ".offer-price",
];

const DESCRIPTION_SELECTORS: &[&str] = &[
    ".product-description",
    "[itemprop=\"description\"]",
    ".description",
    "#product-description",
    ".product-details",
    ".product-info",
    ".product-summary",
    ".product-content",
];

const IMAGE_SELECTORS: &[&str] = &[
    ".product-image img",
    "#product-image img",
    "[itemprop=\"image\"]",
    ".main-image img",
    ".gallery-main img",
    "img.product-img",
    ".product-gallery img",
    ".product-photo img",
];

/// Image attributes, explicit source first
const IMAGE_ATTRIBUTES: &[&str] = &["src", "data-src", "data-lazy-src", "data-zoom-image"];

fn name_from_markup(_: &FieldExtractor, page: &ProductPage<'_>) -> Option<String> {
    NAME_SELECTORS.iter().find_map(|selector| {
        page.document
            .first_text(selector)
            .filter(|text| text.chars().count() > 2)
    })
}

fn name_from_metadata(_: &FieldExtractor, page: &ProductPage<'_>) -> Option<String> {
    page.from_metadata(|m| m.name())
}

fn part_number_from_label(fx: &FieldExtractor, page: &ProductPage<'_>) -> Option<String> {
    fx.patterns().labeled_part_number(&page.text)
}

fn part_number_from_markup(fx: &FieldExtractor, page: &ProductPage<'_>) -> Option<String> {
    PART_NUMBER_SELECTORS.iter().find_map(|selector| {
        let element = page.document.select_first(selector)?;

        let text = fx.patterns().strip_part_prefix(&element_text(&element));
        if !text.is_empty() && text.chars().count() < MAX_IDENTIFIER_CHARS {
            return Some(text);
        }

        ["data-part-number", "data-sku", "content"]
            .iter()
            .find_map(|name| attr(&element, name))
            .map(str::to_string)
    })
}

fn part_number_from_container(_: &FieldExtractor, page: &ProductPage<'_>) -> Option<String> {
    let container = page
        .document
        .select_first("[data-part-number], [data-sku], [data-product-id]")?;

    ["data-part-number", "data-sku", "data-product-id"]
        .iter()
        .find_map(|name| attr(&container, name))
        .map(str::to_string)
}

fn part_number_from_metadata(_: &FieldExtractor, page: &ProductPage<'_>) -> Option<String> {
    page.from_metadata(|m| m.identifier())
}

fn part_number_from_generic_labels(fx: &FieldExtractor, page: &ProductPage<'_>) -> Option<String> {
    fx.patterns().generic_part_number(&page.text)
}

fn sku_from_mpn_label(fx: &FieldExtractor, page: &ProductPage<'_>) -> Option<String> {
    fx.patterns().labeled_mpn(&page.text)
}

fn sku_from_markup(fx: &FieldExtractor, page: &ProductPage<'_>) -> Option<String> {
    SKU_SELECTORS.iter().find_map(|selector| {
        let element = page.document.select_first(selector)?;

        let raw = Some(element_text(&element))
            .filter(|text| !text.is_empty())
            .or_else(|| attr(&element, "data-sku").map(str::to_string))
            .or_else(|| attr(&element, "content").map(str::to_string))?;

        let sku = fx.patterns().strip_sku_prefix(&raw);
        (!sku.is_empty() && sku.chars().count() < MAX_IDENTIFIER_CHARS).then_some(sku)
    })
}

fn sku_from_metadata(_: &FieldExtractor, page: &ProductPage<'_>) -> Option<String> {
    page.from_metadata(|m| m.sku())
}

fn brand_from_label(fx: &FieldExtractor, page: &ProductPage<'_>) -> Option<String> {
    fx.patterns().labeled_brand(&page.text)
}

fn brand_from_markup(_: &FieldExtractor, page: &ProductPage<'_>) -> Option<String> {
    BRAND_SELECTORS.iter().find_map(|selector| {
        let element = page.document.select_first(selector)?;

        if let Some(name) = select_within(&element, "[itemprop=\"name\"]") {
            let text = element_text(&name);
            if !text.is_empty() {
                return Some(text);
            }
        }

        Some(element_text(&element)).filter(|text| !text.is_empty())
    })
}

fn brand_from_metadata(_: &FieldExtractor, page: &ProductPage<'_>) -> Option<String> {
    page.from_metadata(|m| m.brand())
}

fn price_from_currency_text(fx: &FieldExtractor, page: &ProductPage<'_>) -> Option<String> {
    fx.patterns().currency_amount(&page.text)
}

fn price_from_your_price(fx: &FieldExtractor, page: &ProductPage<'_>) -> Option<String> {
    fx.patterns().your_price(&page.text)
}

fn price_from_markup(fx: &FieldExtractor, page: &ProductPage<'_>) -> Option<String> {
    PRICE_SELECTORS.iter().find_map(|selector| {
        let element = page.document.select_first(selector)?;

        if let Some(amount) = attr(&element, "content").and_then(|c| c.parse::<f64>().ok()) {
            return Some(format_price(amount));
        }

        fx.patterns().inline_price(&element_text(&element))
    })
}

fn price_from_metadata(_: &FieldExtractor, page: &ProductPage<'_>) -> Option<String> {
    page.from_metadata(|m| m.offer_price()).map(format_price)
}

fn description_from_markup(_: &FieldExtractor, page: &ProductPage<'_>) -> Option<String> {
    DESCRIPTION_SELECTORS.iter().find_map(|selector| {
        page.document
            .first_text(selector)
            .filter(|text| text.chars().count() > DESCRIPTION_MIN_CHARS)
            .map(|text| truncate_chars(&text, DESCRIPTION_MAX_CHARS))
    })
}

fn description_from_metadata(_: &FieldExtractor, page: &ProductPage<'_>) -> Option<String> {
    page.from_metadata(|m| m.description())
        .map(|text| truncate_chars(&text, DESCRIPTION_MAX_CHARS))
}

fn image_from_markup(_: &FieldExtractor, page: &ProductPage<'_>) -> Option<String> {
    IMAGE_SELECTORS.iter().find_map(|selector| {
        let element = page.document.select_first(selector)?;

        IMAGE_ATTRIBUTES
            .iter()
            .filter_map(|name| attr(&element, name))
            .find(|src| !src.to_ascii_lowercase().starts_with("data:"))
            .and_then(|src| resolve_link(src, page.document.url()))
    })
}

fn image_from_metadata(_: &FieldExtractor, page: &ProductPage<'_>) -> Option<String> {
    page.from_metadata(|m| m.image())
}

/// Formats an amount as dollars with two decimals
fn format_price(amount: f64) -> String {
    format!("${:.2}", amount)
}
