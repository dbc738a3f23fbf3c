use super::ConfigError;
use super::models::Config;
use crate::catalog::Catalog;
use config::{Environment, File};
use std::env;
use std::path::PathBuf;

const CONFIG_ENV_VAR: &str = "TILEINGEST_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/tileingest.toml";
const ENV_PREFIX: &str = "TILEINGEST";
const ENV_SEPARATOR: &str = "__";

/// Plain deployment variables, read after every other source
const BUCKET_ENV_VAR: &str = "BUCKET";
const CATALOG_ENV_VAR: &str = "CATALOG";

/// Credentials for S3-compatible stores; `AWS_*` names are read by the S3 builder itself
const S3_ACCESS_KEY_ENV_VAR: &str = "S3_ACCESS_KEY";
const S3_SECRET_KEY_ENV_VAR: &str = "S3_SECRET_KEY";

/// Load configuration from multiple sources with priority:
/// 1. Defaults (embedded in structs)
/// 2. TOML file (if exists)
/// 3. Environment variables from .env file (via dotenvy)
/// 4. Prefixed environment variables (`TILEINGEST__*`)
/// 5. `BUCKET` and `CATALOG` (highest priority)
pub fn load() -> Result<Config, ConfigError> {
    // Load .env file if it exists (ignore errors if file doesn't exist)
    let _ = dotenvy::dotenv();

    let config_path = env::var(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

    let mut config = load_from_sources(config_path)?;

    apply_deployment_overrides(
        &mut config,
        env::var(BUCKET_ENV_VAR).ok(),
        env::var(CATALOG_ENV_VAR).ok(),
    )?;
    apply_secrets(
        &mut config,
        env::var(S3_ACCESS_KEY_ENV_VAR).ok(),
        env::var(S3_SECRET_KEY_ENV_VAR).ok(),
    );

    Ok(config)
}

/// Apply `BUCKET` and the JSON `CATALOG` blob on top of the layered config
///
/// A malformed catalog is fatal here so that it never surfaces mid-invocation.
pub fn apply_deployment_overrides(
    config: &mut Config,
    bucket: Option<String>,
    catalog: Option<String>,
) -> Result<(), ConfigError> {
    if let Some(bucket) = bucket {
        config.storage.bucket = bucket;
    }

    if let Some(raw) = catalog {
        config.catalog = Catalog::from_json(&raw)?;
        tracing::debug!(entries = config.catalog.len(), "Catalog loaded from environment");
    }

    Ok(())
}

/// Secrets are never stored in TOML files, only in environment
pub fn apply_secrets(config: &mut Config, access_key: Option<String>, secret_key: Option<String>) {
    if access_key.is_some() {
        config.storage.access_key = access_key;
    }
    if secret_key.is_some() {
        config.storage.secret_key = secret_key;
    }
}

/// Load configuration from a specific path and environment
/// Useful for testing with custom config files
pub fn load_from_sources(config_path: PathBuf) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if config_path.exists() {
        tracing::info!("Loading configuration from: {}", config_path.display());
        builder = builder.add_source(File::from(config_path).required(false));
    } else {
        tracing::debug!(
            "Configuration file not found at {}, using defaults and environment overrides",
            config_path.display()
        );
    }

    // TILEINGEST__STORAGE__BUCKET -> storage.bucket
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true),
    );

    let config: Config = builder.build()?.try_deserialize()?;
    Ok(config)
}
