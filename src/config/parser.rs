use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;

    let config: Config = toml::from_str(&content)?;

    validate(&config)?;

    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so a harvest run can be traced back to the exact
/// configuration that produced it.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    const VALID_CONFIG: &str = r#"
[listing]
url = "https://dentacarts.com/products?vendors=61&vendorName=Denta+Carts"
vendor-id = "vendors/Denta-Carts"
default-category-id = "categories/uncategorized"

[http]
max-workers = 3
max-retries = 4

[output]
directory = "./out"

[category-map]
"Dental > Instruments" = "categories/instruments"
"#;

    #[test]
    fn test_load_valid_config() {
        let file = create_temp_config(VALID_CONFIG);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.listing.vendor_id, "vendors/Denta-Carts");
        assert_eq!(config.listing.product_path_prefix, "/products/");
        assert_eq!(config.http.max_workers, 3);
        assert_eq!(config.http.max_retries, 4);
        // Unspecified http keys keep their defaults
        assert_eq!(config.http.timeout_secs, 35);
        assert_eq!(config.output.directory, "./out");
        assert_eq!(
            config.category_map.get("Dental > Instruments").unwrap(),
            "categories/instruments"
        );
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let file = create_temp_config(
            r#"
[listing]
url = "https://dentacarts.com/products?vendors=61&vendorName=Denta+Carts"
vendor-id = "vendors/Denta-Carts"
default-category-id = "categories/uncategorized"
"#,
        );
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.http.max_workers, 5);
        assert_eq!(config.output.directory, ".");
        assert!(config.category_map.is_empty());
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let file = create_temp_config(
            r#"
[listing]
url = "ftp://dentacarts.com/products"
vendor-id = "vendors/Denta-Carts"
default-category-id = "categories/uncategorized"
"#,
        );
        let result = load_config(file.path());
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), ConfigError::Validation(_)));
    }

    #[test]
    fn test_compute_config_hash() {
        let file = create_temp_config("test content");

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("content 1");
        let file2 = create_temp_config("content 2");

        assert_ne!(
            compute_config_hash(file1.path()).unwrap(),
            compute_config_hash(file2.path()).unwrap()
        );
    }
}
