use crate::config::types::{Config, HttpConfig, ListingConfig, OutputConfig};
use crate::ConfigError;
use std::collections::BTreeMap;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_listing_config(&config.listing)?;
    validate_http_config(&config.http)?;
    validate_output_config(&config.output)?;
    validate_category_map(&config.category_map)?;
    Ok(())
}

/// Validates the listing source configuration
fn validate_listing_config(config: &ListingConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid listing url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "listing url must use http or https, got '{}'",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::Validation(
            "listing url must have a host".to_string(),
        ));
    }

    if config.vendor_id.is_empty() {
        return Err(ConfigError::Validation(
            "vendor-id cannot be empty".to_string(),
        ));
    }

    if config.default_category_id.is_empty() {
        return Err(ConfigError::Validation(
            "default-category-id cannot be empty".to_string(),
        ));
    }

    if !config.product_path_prefix.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "product-path-prefix must start with '/', got '{}'",
            config.product_path_prefix
        )));
    }

    Ok(())
}

/// Validates HTTP client configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.max_workers < 1 || config.max_workers > 32 {
        return Err(ConfigError::Validation(format!(
            "max-workers must be between 1 and 32, got {}",
            config.max_workers
        )));
    }

    if config.max_retries < 1 || config.max_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "max-retries must be between 1 and 10, got {}",
            config.max_retries
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if config.user_agent.is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates category map entries
fn validate_category_map(map: &BTreeMap<String, String>) -> Result<(), ConfigError> {
    for (path, category_id) in map {
        if path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "category-map keys cannot be empty".to_string(),
            ));
        }
        if category_id.is_empty() {
            return Err(ConfigError::Validation(format!(
                "category-map entry '{}' has an empty category id",
                path
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            listing: ListingConfig {
                url: "https://dentacarts.com/products?vendors=61&vendorName=Denta+Carts"
                    .to_string(),
                vendor_id: "vendors/Denta-Carts".to_string(),
                default_category_id: "categories/uncategorized".to_string(),
                product_path_prefix: "/products/".to_string(),
            },
            http: HttpConfig::default(),
            output: OutputConfig::default(),
            category_map: BTreeMap::new(),
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate(&base_config()).is_ok());
    }

    #[test]
    fn test_rejects_bad_scheme() {
        let mut config = base_config();
        config.listing.url = "ftp://dentacarts.com/products".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_rejects_unparseable_url() {
        let mut config = base_config();
        config.listing.url = "not a url".to_string();
        assert!(matches!(
            validate(&config).unwrap_err(),
            ConfigError::InvalidUrl(_)
        ));
    }

    #[test]
    fn test_rejects_empty_vendor_id() {
        let mut config = base_config();
        config.listing.vendor_id = String::new();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_rejects_relative_product_prefix() {
        let mut config = base_config();
        config.listing.product_path_prefix = "products/".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_rejects_zero_workers() {
        let mut config = base_config();
        config.http.max_workers = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_rejects_excessive_workers() {
        let mut config = base_config();
        config.http.max_workers = 64;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_rejects_empty_category_id_in_map() {
        let mut config = base_config();
        config
            .category_map
            .insert("Dental > Instruments".to_string(), String::new());
        assert!(validate(&config).is_err());
    }
}
