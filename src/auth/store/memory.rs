//! In-memory token storage.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::instrument;

use super::TokenStorage;
use crate::auth::credentials::StoredCredentials;
use crate::error::Result;

/// In-memory token storage.
///
/// Clones share the same record, so a test can keep a handle and inspect
/// what the gateway persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStorage {
    inner: Arc<RwLock<Option<StoredCredentials>>>,
}

impl MemoryTokenStorage {
    /// Create a new empty MemoryTokenStorage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a MemoryTokenStorage holding `credentials`.
    pub fn with_credentials(credentials: StoredCredentials) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(credentials))),
        }
    }
}

#[async_trait]
impl TokenStorage for MemoryTokenStorage {
    #[instrument(skip(self))]
    async fn load(&self) -> Result<Option<StoredCredentials>> {
        Ok(self.inner.read().await.clone())
    }

    #[instrument(skip(self, credentials))]
    async fn save(&self, credentials: &StoredCredentials) -> Result<()> {
        *self.inner.write().await = Some(credentials.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<()> {
        *self.inner.write().await = None;
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
