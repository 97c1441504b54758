use std::collections::HashSet;

/// Set of URLs seen during one crawl run
///
/// Owned by the coordinator and passed down explicitly, so two runs (or two
/// tests) never share it. Nothing is persisted between runs.
#[derive(Debug, Clone, Default)]
pub struct VisitedSet {
    seen: HashSet<String>,
}

impl VisitedSet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `url` as seen, returning true if it had not been seen before
    pub fn mark_if_new(&mut self, url: &str) -> bool {
        if self.seen.contains(url) {
            return false;
        }
        self.seen.insert(url.to_string())
    }

    /// Returns true if `url` has already been marked
    pub fn contains(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    /// Number of distinct URLs marked so far
    pub fn len(&self) -> usize {
        self.seen.len()
    }
}
