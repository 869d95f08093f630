//! Secret lookup.
//!
//! Secrets are named with kebab-case (`monetization-snippet`). The
//! environment-backed store maps a name to an upper snake-case variable
//! (`MONETIZATION_SNIPPET`); a managed secret store can be plugged in behind
//! the same trait.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::errors::Result;

/// HTML appended to every published post.
pub const MONETIZATION_SNIPPET: &str = "monetization-snippet";

/// Resolves named secrets.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Returns the secret, `None` if it is not defined.
    async fn get(&self, name: &str) -> Result<Option<String>>;
}

/// Reads secrets from process environment variables.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSecretStore;

impl EnvSecretStore {
    /// Environment variable holding the secret `name`.
    #[must_use]
    pub fn variable_for(name: &str) -> String {
        name.replace('-', "_").to_uppercase()
    }
}

#[async_trait]
impl SecretStore for EnvSecretStore {
    async fn get(&self, name: &str) -> Result<Option<String>> {
        Ok(std::env::var(Self::variable_for(name)).ok())
    }
}

/// Fixed set of secrets.
#[derive(Debug, Clone, Default)]
pub struct StaticSecretStore {
    secrets: HashMap<String, String>,
}

impl StaticSecretStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a secret.
    #[must_use]
    pub fn with_secret(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.secrets.insert(name.into(), value.into());
        self
    }
}

#[async_trait]
impl SecretStore for StaticSecretStore {
    async fn get(&self, name: &str) -> Result<Option<String>> {
        Ok(self.secrets.get(name).cloned())
    }
}
