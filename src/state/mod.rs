//! State module for tracking crawl progress
//!
//! This module provides the run-scoped and category-scoped state used while
//! walking listings.
//!
//! # Components
//!
//! - `VisitedSet`: URLs already fetched (or already collected) in this run
//! - `PaginationPhase`: The phases a category walk moves through
//! - `PaginationState`: Per-category counters and deduplicated references

mod pagination_state;
mod visited;

// Re-export main types
pub use pagination_state::{PaginationPhase, PaginationState};
pub use visited::VisitedSet;
