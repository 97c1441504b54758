//! Catalog-Sweep: a retail parts catalog crawler
//!
//! This crate walks category listings of a parts catalog through every
//! pagination mechanism the site exposes (load-more, button clicks and plain
//! page URLs) and turns each product page into a structured [`Product`]
//! using per-field extraction cascades.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod model;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Catalog-Sweep operations
///
/// Only resource-level failures end up here. Failures tied to a single page
/// or product are recorded as [`ErrorRecord`]s and the crawl carries on.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetcher error: {0}")]
    Fetch(#[from] FetchError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors raised by a [`crawler::PageFetcher`]
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Timeout loading {url}")]
    Timeout { url: String },

    #[error("HTTP {status} for {url}")]
    Http { url: String, status: u16 },

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("Operation not supported by this fetcher: {0}")]
    Unsupported(String),

    #[error("Browser error: {0}")]
    Browser(String),
}

/// Result type alias for Catalog-Sweep operations
pub type Result<T> = std::result::Result<T, SweepError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for fetcher operations
pub type FetchResult<T> = std::result::Result<T, FetchError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, Document, PageFetcher};
pub use model::{CategoryMap, ErrorRecord, Product, ProductReference};
pub use state::{PaginationPhase, PaginationState, VisitedSet};
