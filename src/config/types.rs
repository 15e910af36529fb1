use serde::Deserialize;
use std::collections::BTreeMap;

/// Main configuration structure for Shelf-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub listing: ListingConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub output: OutputConfig,
    /// Breadcrumb path (e.g. "Dental > Consumables") to catalog category id.
    /// Sorted so leaf-suffix matching is deterministic.
    #[serde(rename = "category-map", default)]
    pub category_map: BTreeMap<String, String>,
}

/// Listing source configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ListingConfig {
    /// Vendor listing URL, including the `vendors` and `vendorName`
    /// query parameters used to derive output filenames
    pub url: String,

    /// Catalog document id for the vendor (e.g. "vendors/Denta-Carts")
    #[serde(rename = "vendor-id")]
    pub vendor_id: String,

    /// Fallback category id for unmapped breadcrumb paths
    #[serde(rename = "default-category-id")]
    pub default_category_id: String,

    /// Path prefix identifying product links on listing pages
    #[serde(rename = "product-path-prefix", default = "default_product_prefix")]
    pub product_path_prefix: String,
}

/// HTTP client and politeness configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Size of the detail-page worker pool
    #[serde(rename = "max-workers")]
    pub max_workers: u32,

    /// Maximum fetch attempts per URL (transient failures only)
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Request timeout in seconds
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Base backoff in milliseconds; attempt N waits N * backoff-ms
    #[serde(rename = "backoff-ms")]
    pub backoff_ms: u64,

    /// Base delay between listing page fetches (milliseconds, jittered)
    #[serde(rename = "page-delay-ms")]
    pub page_delay_ms: u64,

    /// Base delay before each detail page fetch (milliseconds, jittered)
    #[serde(rename = "detail-delay-ms")]
    pub detail_delay_ms: u64,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Accept-Language header sent with every request
    #[serde(rename = "accept-language")]
    pub accept_language: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            max_workers: 5,
            max_retries: 5,
            timeout_secs: 35,
            backoff_ms: 1200,
            page_delay_ms: 500,
            detail_delay_ms: 50,
            user_agent: concat!(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) ",
                "AppleWebKit/537.36 (KHTML, like Gecko) ",
                "Chrome/120.0.0.0 Safari/537.36"
            )
            .to_string(),
            accept_language: "en-US,en;q=0.9,ar;q=0.8".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory where the raw and schema JSON files are written
    pub directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: ".".to_string(),
        }
    }
}

fn default_product_prefix() -> String {
    "/products/".to_string()
}
