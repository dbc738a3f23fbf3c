//! Provider catalog: the static list of tile layers an invocation ingests

use serde::{Deserialize, Serialize};

/// Upper bound on entries considered by a single invocation
pub const MAX_ENTRIES: usize = 50;

/// One tile provider entry
///
/// Every field is optional; entries missing `base_url` or `layer` are skipped
/// at invocation time rather than rejected here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CatalogEntry {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub layer: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
}

impl CatalogEntry {
    pub fn new(
        base_url: impl Into<String>,
        layer: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            base_url: Some(base_url.into()),
            layer: Some(layer.into()),
            provider: Some(provider.into()),
        }
    }
}

/// Ordered catalog of entries
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Catalog {
    #[serde(default)]
    pub entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// Parse the JSON blob carried by the `CATALOG` variable
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Entries an invocation is allowed to look at
    pub fn window(&self) -> &[CatalogEntry] {
        let end = self.entries.len().min(MAX_ENTRIES);
        &self.entries[..end]
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
