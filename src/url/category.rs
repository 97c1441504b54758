use crate::model::CategoryMap;

/// Derives a category slug from its display name
///
/// # Examples
///
/// ```
/// use catalog_sweep::url::slugify;
///
/// assert_eq!(slugify("Brakes & Wheel End"), "brakes-and-wheel-end");
/// ```
pub fn slugify(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .replace('&', "and")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// Applies user category filters to the known or discovered categories
///
/// Each filter is matched in priority order:
/// 1. Exact slug match
/// 2. First slug that contains the filter, or that the filter contains
/// 3. Otherwise a warning is logged and the filter is dropped
///
/// An empty filter list selects every category.
pub fn select_categories(all: &CategoryMap, filters: &[String]) -> CategoryMap {
    if filters.is_empty() {
        return all.clone();
    }

    let mut selected = CategoryMap::new();

    for filter in filters {
        let wanted = filter.trim().to_lowercase().replace(' ', "-");
        if wanted.is_empty() {
            continue;
        }

        if let Some(url) = all.get(&wanted) {
            selected.insert(wanted, url.clone());
            continue;
        }

        let partial = all
            .iter()
            .find(|(slug, _)| slug.contains(&wanted) || wanted.contains(slug.as_str()));

        match partial {
            Some((slug, url)) => {
                tracing::debug!("Category '{}' matched '{}' by substring", filter, slug);
                selected.insert(slug.clone(), url.clone());
            }
            None => {
                tracing::warn!(
                    "Category '{}' not found. Available: {:?}",
                    filter,
                    all.keys().collect::<Vec<_>>()
                );
            }
        }
    }

    selected
}
