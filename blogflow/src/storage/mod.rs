//! Blob storage for pipeline artifacts.
//!
//! Artifact keys are `/`-separated relative paths; the key layout in
//! [`paths`] is the contract between stages. Every stage coordinates only
//! through the presence or absence of these artifacts.

mod fs;
mod memory;
pub mod paths;

pub use fs::FsBlobStore;
pub use memory::InMemoryBlobStore;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::{BlogflowError, Result};

/// Backend holding pipeline artifacts.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Returns true if an artifact exists under `key`.
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Reads an artifact, `None` if absent.
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Creates or overwrites an artifact.
    async fn write(&self, key: &str, data: &[u8]) -> Result<()>;

    /// Lists every key starting with `prefix`, sorted.
    async fn list(&self, prefix: &str) -> Result<Vec<String>>;
}

/// Reads an artifact as UTF-8 text.
pub async fn read_text(store: &dyn BlobStore, key: &str) -> Result<Option<String>> {
    match store.read(key).await? {
        Some(bytes) => String::from_utf8(bytes)
            .map(Some)
            .map_err(|e| BlogflowError::storage(key, format!("not valid UTF-8: {e}"))),
        None => Ok(None),
    }
}

/// Reads and deserializes a JSON artifact.
pub async fn read_json<T: DeserializeOwned>(store: &dyn BlobStore, key: &str) -> Result<Option<T>> {
    match store.read(key).await? {
        Some(bytes) => serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| BlogflowError::storage(key, format!("invalid JSON: {e}"))),
        None => Ok(None),
    }
}

/// Serializes `value` as pretty JSON and writes it.
pub async fn write_json<T: Serialize + ?Sized>(store: &dyn BlobStore, key: &str, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value)?;
    store.write(key, &bytes).await
}

/// Rejects keys that could escape the store root.
pub(crate) fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() || key.starts_with('/') || key.contains('\\') {
        return Err(BlogflowError::InvalidPath(key.to_string()));
    }
    if key.split('/').any(|segment| segment.is_empty() || segment == "." || segment == "..") {
        return Err(BlogflowError::InvalidPath(key.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key() {
        assert!(validate_key("generated/abc/.run").is_ok());
        assert!(validate_key("ready.json").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("/etc/passwd").is_err());
        assert!(validate_key("generated/../secret").is_err());
        assert!(validate_key("generated//x").is_err());
    }

    #[tokio::test]
    async fn test_json_helpers() {
        let store = InMemoryBlobStore::new();
        write_json(&store, "frequency.json", &serde_json::json!({"daily": 3})).await.unwrap();

        let value: Option<serde_json::Value> = read_json(&store, "frequency.json").await.unwrap();
        assert_eq!(value, Some(serde_json::json!({"daily": 3})));

        let missing: Option<serde_json::Value> = read_json(&store, "nope.json").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_read_json_reports_malformed() {
        let store = InMemoryBlobStore::new();
        store.write("frequency.json", b"{daily").await.unwrap();

        let result: Result<Option<serde_json::Value>> = read_json(&store, "frequency.json").await;
        assert!(matches!(result, Err(BlogflowError::Storage { .. })));
    }
}
