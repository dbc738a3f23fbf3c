//! Configuration management for tileingest
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables
//! 4. The `BUCKET` and `CATALOG` deployment variables (highest priority)
//!
//! Configuration is resolved once at process start and handed to the
//! ingestor by reference; nothing reads the environment during an invocation.
//!
//! # Usage
//!
//! ```no_run
//! use tileingest::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Catalog entries: {}", config.catalog.len());
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `TILEINGEST__<section>__<key>`
//!
//! Examples:
//! - `TILEINGEST__STORAGE__PROVIDER=local`
//! - `TILEINGEST__FETCH__REQUEST_TIMEOUT_SECS=10`
//!
//! `CATALOG` carries the catalog as a JSON blob:
//! `{"entries": [{"base_url": "...", "layer": "...", "provider": "..."}]}`
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/tileingest.toml`.
//! This can be overridden using the `TILEINGEST_CONFIG` environment variable.

mod models;
mod sources;
mod validation;

pub use models::{Config, FetchConfig, StorageConfig, StorageProvider};
pub use sources::apply_deployment_overrides;
pub use validation::ValidationError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),

    #[error("Malformed catalog JSON: {0}")]
    Catalog(#[from] serde_json::Error),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file is malformed
    /// - `CATALOG` is not valid JSON
    /// - Validation fails
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path
    ///
    /// Useful for testing with custom configuration files.
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_minimal_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[storage]
bucket = "tiles-raw"
region = "eu-west-1"
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let config = Config::load_from_path(config_path).unwrap();
        assert_eq!(config.storage.provider, StorageProvider::S3);
        assert_eq!(config.storage.bucket, "tiles-raw");
        assert_eq!(config.storage.region.as_deref(), Some("eu-west-1"));
        assert!(config.catalog.is_empty());
    }

    #[test]
    fn test_validation_catches_zero_timeout() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[fetch]
request_timeout_secs = 0
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let result = Config::load_from_path(config_path);
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::ValidationError(ValidationError::InvalidRequestTimeout)
        ));
    }

    #[test]
    fn test_malformed_file_is_load_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        fs::write(&config_path, "[storage\nbucket = ").unwrap();

        let result = Config::load_from_path(config_path);
        assert!(matches!(result.unwrap_err(), ConfigError::LoadError(_)));
    }
}
