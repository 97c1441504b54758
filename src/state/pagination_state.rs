/// Pagination phase definitions for a single category walk
///
/// A category moves through the phases in order and never returns to an
/// earlier one. Each phase is an independent attempt, not a retry of the
/// previous mechanism.
use crate::model::ProductReference;
use std::collections::HashSet;
use std::fmt;

/// Represents where a category walk currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PaginationPhase {
    /// Fetching the category's first listing page
    Initial,

    /// Clicking the in-place "load more" control
    LoadMore,

    /// Clicking "next page" / "go to page N" controls
    ButtonPagination,

    /// Fetching numbered page URLs linked from the current document
    UrlSweep,

    /// References are final
    Done,
}

impl PaginationPhase {
    /// Returns true if moving from this phase to `next` is allowed
    ///
    /// Phases only move forward; `LoadMore -> UrlSweep` skips button
    /// pagination and is valid.
    pub fn can_advance_to(&self, next: PaginationPhase) -> bool {
        next > *self
    }

    /// Returns true if no further work happens in this phase
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Short lowercase label used in log lines
    pub fn label(&self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::LoadMore => "load_more",
            Self::ButtonPagination => "button_pagination",
            Self::UrlSweep => "url_sweep",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for PaginationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Per-category pagination bookkeeping
///
/// `collected_references` never holds two entries with the same URL.
#[derive(Debug, Clone)]
pub struct PaginationState {
    pub phase: PaginationPhase,
    pub current_page: u32,
    pub visited_page_urls: HashSet<String>,
    pub consecutive_empty_pages: u32,
    pub load_more_attempts: u32,
    collected_references: Vec<ProductReference>,
    collected_urls: HashSet<String>,
}

impl PaginationState {
    /// Creates the state for a category whose first page is `start_url`
    pub fn new(start_url: &str) -> Self {
        let mut visited_page_urls = HashSet::new();
        visited_page_urls.insert(start_url.to_string());

        Self {
            phase: PaginationPhase::Initial,
            current_page: 1,
            visited_page_urls,
            consecutive_empty_pages: 0,
            load_more_attempts: 0,
            collected_references: Vec::new(),
            collected_urls: HashSet::new(),
        }
    }

    /// Moves to `next` if the transition is forward; returns whether it moved
    pub fn advance(&mut self, next: PaginationPhase) -> bool {
        if !self.phase.can_advance_to(next) {
            tracing::warn!(
                "Ignoring backwards pagination transition: {} -> {}",
                self.phase,
                next
            );
            return false;
        }
        tracing::trace!("Pagination phase {} -> {}", self.phase, next);
        self.phase = next;
        true
    }

    /// Appends references not collected yet, preserving discovery order
    ///
    /// Returns the number of references that were new.
    pub fn merge(&mut self, references: Vec<ProductReference>) -> usize {
        let mut added = 0;
        for reference in references {
            if self.collected_urls.insert(reference.url.clone()) {
                self.collected_references.push(reference);
                added += 1;
            }
        }
        added
    }

    /// Records the result of a button-pagination page
    pub fn record_page_gain(&mut self, new_count: usize) {
        if new_count == 0 {
            self.consecutive_empty_pages += 1;
        } else {
            self.consecutive_empty_pages = 0;
        }
    }

    /// Returns true once `cap` references have been collected
    pub fn cap_reached(&self, cap: Option<usize>) -> bool {
        matches!(cap, Some(limit) if self.collected_references.len() >= limit)
    }

    /// Number of references collected so far
    pub fn collected_len(&self) -> usize {
        self.collected_references.len()
    }

    /// Finishes the walk, truncating to `cap` (no sampling)
    pub fn finish(mut self, cap: Option<usize>) -> Vec<ProductReference> {
        self.advance(PaginationPhase::Done);
        if let Some(limit) = cap {
            self.collected_references.truncate(limit);
        }
        self.collected_references
    }
}
