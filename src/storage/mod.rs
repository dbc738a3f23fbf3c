//! Object storage abstraction for raw provider documents
//! Uses Apache Arrow object_store crate

use bytes::Bytes;
use object_store::{
    Attribute, Attributes, ObjectStore, PutOptions, aws::AmazonS3Builder,
    local::LocalFileSystem, memory::InMemory, path::Path as StoragePath,
};
use std::sync::Arc;
use thiserror::Error;

use crate::config::{StorageConfig, StorageProvider};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("No bucket configured")]
    MissingBucket,

    #[error("Failed to prepare local root: {0}")]
    LocalRoot(#[from] std::io::Error),

    #[error("Object store error: {0}")]
    ObjectStoreError(#[from] object_store::Error),
}

/// Storage result type
pub type Result<T> = std::result::Result<T, StorageError>;

/// Metadata returned after a write
#[derive(Debug, Clone)]
pub struct PutMetadata {
    pub key: String,
    pub etag: Option<String>,
    pub size: usize,
}

/// Storage client wrapping object_store
///
/// A client without a backend is legal: it fails on every write, which is how
/// an empty bucket name behaves.
#[derive(Clone)]
pub struct StorageClient {
    store: Option<Arc<dyn ObjectStore>>,
    pub bucket: String,
    /// The local filesystem backend cannot persist object attributes
    attributes: bool,
}

impl StorageClient {
    /// Create new storage client with any object_store backend
    pub fn new(store: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Self {
        Self {
            store: Some(store),
            bucket: bucket.into(),
            attributes: true,
        }
    }

    /// Create in-memory storage for testing/development
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemory::new()), "tileingest-local")
    }

    /// Client that rejects every write
    pub fn unconfigured() -> Self {
        Self {
            store: None,
            bucket: String::new(),
            attributes: false,
        }
    }

    /// Build the backend selected by configuration
    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        if config.bucket.is_empty() {
            tracing::warn!(provider = ?config.provider, "No bucket configured, writes will fail");
            return Ok(Self::unconfigured());
        }

        let mut attributes = true;
        let store: Arc<dyn ObjectStore> = match config.provider {
            StorageProvider::S3 => {
                let mut builder = AmazonS3Builder::from_env().with_bucket_name(&config.bucket);
                if let Some(region) = &config.region {
                    builder = builder.with_region(region);
                }
                if let Some(endpoint) = &config.endpoint {
                    builder = builder
                        .with_endpoint(endpoint)
                        .with_allow_http(endpoint.starts_with("http://"));
                }
                if let Some(access_key) = &config.access_key {
                    builder = builder.with_access_key_id(access_key);
                }
                if let Some(secret_key) = &config.secret_key {
                    builder = builder.with_secret_access_key(secret_key);
                }
                Arc::new(builder.build()?)
            }
            StorageProvider::Local => {
                let root = config.root.join(&config.bucket);
                std::fs::create_dir_all(&root)?;
                attributes = false;
                Arc::new(LocalFileSystem::new_with_prefix(root)?)
            }
            StorageProvider::Memory => Arc::new(InMemory::new()),
        };

        tracing::info!(provider = ?config.provider, bucket = %config.bucket, "Storage backend ready");

        Ok(Self {
            attributes,
            ..Self::new(store, config.bucket.clone())
        })
    }

    /// Location a key resolves to; empty path segments are dropped
    pub fn object_location(key: &str) -> String {
        StoragePath::from(key).to_string()
    }

    /// Write bytes at `key`, replacing whatever is there
    pub async fn put(
        &self,
        key: &str,
        data: Bytes,
        content_type: Option<&str>,
    ) -> Result<PutMetadata> {
        let store = self.store.as_ref().ok_or(StorageError::MissingBucket)?;
        let path = StoragePath::from(key);
        let size = data.len();

        let mut attributes = Attributes::new();
        if let Some(content_type) = content_type.filter(|_| self.attributes) {
            attributes.insert(Attribute::ContentType, content_type.to_string().into());
        }
        let opts = PutOptions {
            attributes,
            ..Default::default()
        };

        let put_result = store.put_opts(&path, data.into(), opts).await?;

        tracing::info!(key, size, "Uploaded to storage");

        Ok(PutMetadata {
            key: path.to_string(),
            etag: put_result.e_tag,
            size,
        })
    }

    /// Read an object back along with its declared content type
    pub async fn get(&self, key: &str) -> Result<(Bytes, Option<String>)> {
        let store = self.store.as_ref().ok_or(StorageError::MissingBucket)?;
        let path = StoragePath::from(key);

        let result = store.get(&path).await?;
        let content_type = result
            .attributes
            .get(&Attribute::ContentType)
            .map(|value| value.to_string());
        let bytes = result.bytes().await?;

        Ok((bytes, content_type))
    }

    /// Check if key exists
    pub async fn exists(&self, key: &str) -> Result<bool> {
        let store = self.store.as_ref().ok_or(StorageError::MissingBucket)?;
        let path = StoragePath::from(key);

        match store.head(&path).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_put_records_content_type() {
        let storage = StorageClient::in_memory();

        let meta = storage
            .put("raw/osm/abc.txt", Bytes::from_static(b"<Capabilities/>"), Some("text/plain"))
            .await
            .unwrap();
        assert_eq!(meta.key, "raw/osm/abc.txt");
        assert_eq!(meta.size, 15);

        let (bytes, content_type) = storage.get("raw/osm/abc.txt").await.unwrap();
        assert_eq!(bytes, Bytes::from_static(b"<Capabilities/>"));
        assert_eq!(content_type.as_deref(), Some("text/plain"));
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let storage = StorageClient::in_memory();

        storage.put("k", Bytes::from_static(b"first"), None).await.unwrap();
        storage.put("k", Bytes::from_static(b"second"), None).await.unwrap();

        let (bytes, content_type) = storage.get("k").await.unwrap();
        assert_eq!(bytes, Bytes::from_static(b"second"));
        assert_eq!(content_type, None);
    }

    #[tokio::test]
    async fn test_exists() {
        let storage = StorageClient::in_memory();
        assert!(!storage.exists("raw/x.txt").await.unwrap());

        storage.put("raw/x.txt", Bytes::from_static(b"x"), None).await.unwrap();
        assert!(storage.exists("raw/x.txt").await.unwrap());
    }

    #[test]
    fn test_object_location_drops_empty_segments() {
        assert_eq!(StorageClient::object_location("raw//abc.txt"), "raw/abc.txt");
        assert_eq!(StorageClient::object_location("raw/osm/abc.txt"), "raw/osm/abc.txt");
    }

    #[tokio::test]
    async fn test_put_reports_resolved_key() {
        let storage = StorageClient::in_memory();

        let meta = storage
            .put("raw//abc.txt", Bytes::from_static(b"x"), None)
            .await
            .unwrap();
        assert_eq!(meta.key, "raw/abc.txt");
    }

    #[tokio::test]
    async fn test_unconfigured_rejects_writes() {
        let storage = StorageClient::unconfigured();

        let err = storage
            .put("raw/x.txt", Bytes::from_static(b"x"), Some("text/plain"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::MissingBucket));
    }

    #[test]
    fn test_empty_bucket_builds_unconfigured_client() {
        let config = StorageConfig::default();

        let storage = StorageClient::from_config(&config).unwrap();
        assert!(storage.bucket.is_empty());
        assert!(storage.store.is_none());
    }

    #[tokio::test]
    async fn test_local_provider_writes_under_bucket_dir() {
        let temp_dir = TempDir::new().unwrap();
        let config = StorageConfig {
            provider: StorageProvider::Local,
            bucket: "tiles".to_string(),
            root: PathBuf::from(temp_dir.path()),
            ..Default::default()
        };

        let storage = StorageClient::from_config(&config).unwrap();
        storage
            .put("raw/osm/abc.txt", Bytes::from_static(b"hello"), Some("text/plain"))
            .await
            .unwrap();

        let on_disk = std::fs::read(temp_dir.path().join("tiles/raw/osm/abc.txt")).unwrap();
        assert_eq!(on_disk, b"hello");
    }
}
