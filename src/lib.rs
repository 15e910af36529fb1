//! Shelf-Harvest: a single-vendor product listing harvester
//!
//! This crate crawls a paginated e-commerce vendor listing, extracts
//! structured product data from each detail page, and remaps the results
//! into the document shape expected by a downstream catalog system.

pub mod config;
pub mod crawler;
pub mod mapper;
pub mod output;
pub mod text;
pub mod url;

use thiserror::Error;

/// Main error type for harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Gave up fetching {url} after {attempts} attempts")]
    RetriesExhausted { url: String, attempts: u32 },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("URL {url} has no host")]
    MissingHost { url: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No product URLs found on listing {url}")]
    EmptyListing { url: String },

    #[error("Worker pool closed unexpectedly")]
    PoolClosed,

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

/// Result type alias for harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Harvester, RawProduct};
pub use mapper::{to_catalog_doc, ProductDoc};
pub use url::VendorRef;
