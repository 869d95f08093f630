//! In-memory blob store.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::{validate_key, BlobStore};
use crate::errors::{BlogflowError, Result};

/// Blob store kept in a map, used by tests and dry runs.
///
/// Individual keys can be marked as failing so tests can exercise partial
/// write failures.
#[derive(Debug, Default, Clone)]
pub struct InMemoryBlobStore {
    blobs: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
    failing: Arc<Mutex<Vec<String>>>,
}

impl InMemoryBlobStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every read and write of `key` fail.
    pub fn fail_on(&self, key: impl Into<String>) {
        self.failing.lock().push(key.into());
    }

    /// Returns the number of stored artifacts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blobs.lock().len()
    }

    /// Returns true if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blobs.lock().is_empty()
    }

    /// Returns the stored keys.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.blobs.lock().keys().cloned().collect()
    }

    fn check(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        if self.failing.lock().iter().any(|k| k == key) {
            return Err(BlogflowError::storage(key, "injected failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn exists(&self, key: &str) -> Result<bool> {
        self.check(key)?;
        Ok(self.blobs.lock().contains_key(key))
    }

    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.check(key)?;
        Ok(self.blobs.lock().get(key).cloned())
    }

    async fn write(&self, key: &str, data: &[u8]) -> Result<()> {
        self.check(key)?;
        self.blobs.lock().insert(key.to_string(), data.to_vec());
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .blobs
            .lock()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_read_exists() {
        let store = InMemoryBlobStore::new();
        assert!(!store.exists("ready.json").await.unwrap());

        store.write("ready.json", b"{}").await.unwrap();

        assert!(store.exists("ready.json").await.unwrap());
        assert_eq!(store.read("ready.json").await.unwrap(), Some(b"{}".to_vec()));
    }

    #[tokio::test]
    async fn test_list_by_prefix() {
        let store = InMemoryBlobStore::new();
        store.write("generated/b/.run", b"").await.unwrap();
        store.write("generated/a/.run", b"").await.unwrap();
        store.write("integrations/mailchimp.json", b"{}").await.unwrap();

        let keys = store.list("generated/").await.unwrap();
        assert_eq!(keys, vec!["generated/a/.run", "generated/b/.run"]);
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let store = InMemoryBlobStore::new();
        store.fail_on("integrations/mailchimp.json");

        assert!(store.write("integrations/mailchimp.json", b"{}").await.is_err());
        assert!(store.write("integrations/google_analytics.json", b"{}").await.is_ok());
    }
}
