use super::models::{Config, StorageProvider};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Request timeout must be positive")]
    InvalidRequestTimeout,

    #[error("Storage provider is local but no root directory is configured")]
    MissingLocalRoot,
}

/// Validate the entire configuration
///
/// The catalog is intentionally left alone: bad entries are skipped per invocation.
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_fetch(config)?;
    validate_storage(config)?;
    Ok(())
}

fn validate_fetch(config: &Config) -> Result<(), ValidationError> {
    if config.fetch.request_timeout_secs == 0 {
        return Err(ValidationError::InvalidRequestTimeout);
    }
    Ok(())
}

fn validate_storage(config: &Config) -> Result<(), ValidationError> {
    if config.storage.provider == StorageProvider::Local
        && config.storage.root.as_os_str().is_empty()
    {
        return Err(ValidationError::MissingLocalRoot);
    }
    Ok(())
}
