//! Parsed HTML documents
//!
//! A `Document` wraps a parsed page together with the URL it was loaded
//! from, and offers the selector queries and text extraction the listing and
//! field extractors are built on.

use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Elements whose text never counts as visible page text
const NON_TEXT_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// A loaded page
#[derive(Debug, Clone)]
pub struct Document {
    url: Url,
    source: String,
    html: Html,
}

impl Document {
    /// Parses `source` as a full HTML document loaded from `url`
    ///
    /// # Example
    ///
    /// ```
    /// use catalog_sweep::crawler::Document;
    /// use url::Url;
    ///
    /// let html = r#"<html><head><title>Pads</title></head><body><h1>Brake Pad</h1></body></html>"#;
    /// let doc = Document::parse(Url::parse("https://example.com/parts/pad").unwrap(), html);
    /// assert_eq!(doc.title(), Some("Pads".to_string()));
    /// assert_eq!(doc.first_text("h1"), Some("Brake Pad".to_string()));
    /// ```
    pub fn parse(url: Url, source: &str) -> Self {
        Self {
            url,
            source: source.to_string(),
            html: Html::parse_document(source),
        }
    }

    /// The URL this document was loaded from
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Raw HTML as loaded
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Extracts the page title from the `<title>` tag
    pub fn title(&self) -> Option<String> {
        self.first_text("title")
    }

    /// Returns the first element matching `selector`
    ///
    /// Selectors that fail to parse are treated as matching nothing.
    pub fn select_first(&self, selector: &str) -> Option<ElementRef<'_>> {
        let selector = parse_selector(selector)?;
        self.html.select(&selector).next()
    }

    /// Returns every element matching `selector`, in document order
    pub fn select_all(&self, selector: &str) -> Vec<ElementRef<'_>> {
        match parse_selector(selector) {
            Some(selector) => self.html.select(&selector).collect(),
            None => Vec::new(),
        }
    }

    /// Normalized text of the first element matching `selector`, if non-empty
    pub fn first_text(&self, selector: &str) -> Option<String> {
        self.select_first(selector)
            .map(|element| element_text(&element))
            .filter(|text| !text.is_empty())
    }

    /// Visible text of the whole page
    ///
    /// Text nodes are trimmed and joined with newlines, so labels rendered
    /// in adjacent elements stay on separate lines. Script and style content
    /// is skipped.
    pub fn text(&self) -> String {
        let mut pieces = Vec::new();

        for node in self.html.tree.root().descendants() {
            let Some(text) = node.value().as_text() else {
                continue;
            };

            let hidden = node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|el| NON_TEXT_ELEMENTS.contains(&el.name()))
            });
            if hidden {
                continue;
            }

            let trimmed = text.trim();
            if !trimmed.is_empty() {
                pieces.push(trimmed);
            }
        }

        pieces.join("\n")
    }

    /// Raw contents of every embedded JSON-LD block
    pub fn json_ld_blocks(&self) -> Vec<String> {
        self.select_all(r#"script[type="application/ld+json"]"#)
            .into_iter()
            .map(|script| script.text().collect::<String>())
            .collect()
    }
}

/// Parses a CSS selector, logging and discarding invalid ones
pub fn parse_selector(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::debug!("Invalid selector '{}': {:?}", selector, e);
            None
        }
    }
}

/// First descendant of `element` matching `selector`
pub fn select_within<'a>(element: &ElementRef<'a>, selector: &str) -> Option<ElementRef<'a>> {
    let selector = parse_selector(selector)?;
    element.select(&selector).next()
}

/// Every descendant of `element` matching `selector`
pub fn select_all_within<'a>(element: &ElementRef<'a>, selector: &str) -> Vec<ElementRef<'a>> {
    match parse_selector(selector) {
        Some(selector) => element.select(&selector).collect(),
        None => Vec::new(),
    }
}

/// Text content of an element with whitespace runs collapsed to one space
pub fn element_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Value of an attribute, trimmed, if present and non-empty
pub fn attr<'a>(element: &ElementRef<'a>, name: &str) -> Option<&'a str> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
