//! Content-addressed storage keys

use sha1::{Digest, Sha1};

/// `raw/{provider}/{sha1(url)}.txt`
///
/// Depends on the URL and provider only, so repeated runs land on the same key.
pub fn storage_key(provider: &str, url: &str) -> String {
    format!("raw/{}/{}.txt", provider, url_digest(url))
}

/// Lowercase hex SHA-1 of the URL bytes
pub fn url_digest(url: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(url.as_bytes());
    format!("{:x}", hasher.finalize())
}
