use url::Url;

/// Path fragment shared by category and product URLs on the catalog site
pub const PRODUCT_PATH_MARKER: &str = "/parts/";

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
///
/// # Examples
///
/// ```
/// use catalog_sweep::url::resolve_link;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/parts/brakes").unwrap();
/// assert_eq!(
///     resolve_link("/parts/brakes?page=2", &base).as_deref(),
///     Some("https://example.com/parts/brakes?page=2")
/// );
/// assert_eq!(resolve_link("javascript:void(0)", &base), None);
/// ```
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) if matches!(absolute_url.scheme(), "http" | "https") => {
            Some(absolute_url.to_string())
        }
        _ => None,
    }
}

/// Counts the non-empty segments of a URL path
pub fn path_segment_count(url: &Url) -> usize {
    url.path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).count())
        .unwrap_or(0)
}

/// Returns false for links under the parts tree that are too shallow to be
/// a product page (`/parts` itself or a bare `/parts/` listing root)
///
/// Links outside the parts tree are not judged here.
pub fn is_product_path(url: &Url) -> bool {
    let path = url.path();
    let marker = PRODUCT_PATH_MARKER.trim_end_matches('/');

    if !path.contains(PRODUCT_PATH_MARKER) && path.trim_end_matches('/') != marker {
        return true;
    }

    path_segment_count(url) >= 2
}
