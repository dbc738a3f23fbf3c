//! Invocation handler
//!
//! Walks the first [`MAX_ENTRIES`] catalog entries one at a time, fetching each
//! provider URL and writing the raw body under a content-addressed key. Entry
//! failures are logged and recorded as an [`EntryOutcome`]; they never abort the
//! invocation.

mod key;

pub use key::{storage_key, url_digest};

use serde::{Deserialize, Serialize};
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use crate::catalog::{Catalog, CatalogEntry, MAX_ENTRIES};
use crate::fetch::{FetchError, HttpClient};
use crate::storage::{StorageClient, StorageError};

/// Why an entry was passed over without any I/O
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// `base_url` or `layer` absent or empty
    MissingField,
    /// `base_url` does not contain `"http"`
    NotHttp,
}

/// Result of processing one catalog entry
#[derive(Debug)]
pub enum EntryOutcome {
    Stored { key: String, size: usize },
    Skipped(SkipReason),
    FetchFailed { key: String, error: FetchError },
    StoreFailed { key: String, error: StorageError },
}

impl EntryOutcome {
    pub fn is_stored(&self) -> bool {
        matches!(self, EntryOutcome::Stored { .. })
    }
}

/// What callers of an invocation get back: `{"stored": n}`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationSummary {
    pub stored: usize,
}

/// Per-entry outcomes of one invocation, in catalog order
#[derive(Debug, Default)]
pub struct InvocationReport {
    pub outcomes: Vec<EntryOutcome>,
}

impl InvocationReport {
    pub fn stored(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_stored()).count()
    }

    pub fn summary(&self) -> InvocationSummary {
        InvocationSummary {
            stored: self.stored(),
        }
    }
}

/// Fetch-and-store pipeline with injected clients
#[derive(Clone)]
pub struct Ingestor {
    http: HttpClient,
    storage: StorageClient,
}

impl Ingestor {
    pub fn new(http: HttpClient, storage: StorageClient) -> Self {
        Self { http, storage }
    }

    /// Run one invocation and reduce it to the caller-facing summary
    pub async fn invoke(&self, catalog: &Catalog) -> InvocationSummary {
        self.run(catalog).await.summary()
    }

    /// Run one invocation, keeping every entry's outcome
    pub async fn run(&self, catalog: &Catalog) -> InvocationReport {
        let invocation_id = Uuid::now_v7();
        let span = info_span!("invocation", %invocation_id);

        async {
            let window = catalog.window();
            let mut report = InvocationReport {
                outcomes: Vec::with_capacity(window.len()),
            };

            for entry in window {
                report.outcomes.push(self.process_entry(entry).await);
            }

            info!(
                stored = report.stored(),
                considered = window.len(),
                catalog_size = catalog.len(),
                limit = MAX_ENTRIES,
                "Invocation finished"
            );

            report
        }
        .instrument(span)
        .await
    }

    /// Validate, fetch and store a single entry
    pub async fn process_entry(&self, entry: &CatalogEntry) -> EntryOutcome {
        let (base_url, _layer) = match (non_empty(&entry.base_url), non_empty(&entry.layer)) {
            (Some(base_url), Some(layer)) => (base_url, layer),
            _ => return EntryOutcome::Skipped(SkipReason::MissingField),
        };

        // Only a substring check; the layer is not used to shape the request
        if !base_url.contains("http") {
            return EntryOutcome::Skipped(SkipReason::NotHttp);
        }

        let url = base_url;
        // Report the location the object store actually writes to
        let key = StorageClient::object_location(&storage_key(
            entry.provider.as_deref().unwrap_or_default(),
            url,
        ));

        let fetched = match self.http.fetch(url).await {
            Ok(fetched) => fetched,
            Err(error) => {
                warn!(url, key = %key, error = %error, "Fetch failed, skipping entry");
                return EntryOutcome::FetchFailed { key, error };
            }
        };

        let size = fetched.body.len();
        match self
            .storage
            .put(&key, fetched.body, Some(mime::TEXT_PLAIN.essence_str()))
            .await
        {
            Ok(meta) => EntryOutcome::Stored {
                key: meta.key,
                size,
            },
            Err(error) => {
                warn!(url, key = %key, error = %error, "Store failed, skipping entry");
                EntryOutcome::StoreFailed { key, error }
            }
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
