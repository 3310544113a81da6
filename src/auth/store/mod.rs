//! Token storage backends for persisting the session's credentials.
//!
//! Provides the [`TokenStorage`] trait and implementations:
//! - [`FileTokenStorage`] - JSON file with 0600 permissions
//! - [`MemoryTokenStorage`] - In-memory (testing, ephemeral sessions)
//! - [`KeyringTokenStorage`] - System keyring (feature-gated)

mod file;
mod memory;

#[cfg(feature = "system-keyring")]
mod keyring;

use async_trait::async_trait;

pub use file::FileTokenStorage;
pub use memory::MemoryTokenStorage;

#[cfg(feature = "system-keyring")]
pub use keyring::KeyringTokenStorage;

use crate::auth::credentials::StoredCredentials;
use crate::error::Result;

/// Trait for token storage backends.
///
/// A backend holds at most one [`StoredCredentials`] record. `save`
/// replaces the whole record, so both tokens always change together.
#[async_trait]
pub trait TokenStorage: Send + Sync {
    /// Load the stored credentials, if any.
    async fn load(&self) -> Result<Option<StoredCredentials>>;

    /// Replace the stored credentials.
    async fn save(&self, credentials: &StoredCredentials) -> Result<()>;

    /// Remove both tokens.
    async fn clear(&self) -> Result<()>;

    /// Check if any credentials are stored.
    async fn exists(&self) -> Result<bool> {
        Ok(self.load().await?.is_some_and(|c| !c.is_empty()))
    }

    /// Name of this storage backend.
    fn name(&self) -> &str {
        "unknown"
    }
}

/// Blanket impl for `Arc<T>`.
#[async_trait]
impl<T: TokenStorage + ?Sized> TokenStorage for std::sync::Arc<T> {
    async fn load(&self) -> Result<Option<StoredCredentials>> {
        (**self).load().await
    }
    async fn save(&self, credentials: &StoredCredentials) -> Result<()> {
        (**self).save(credentials).await
    }
    async fn clear(&self) -> Result<()> {
        (**self).clear().await
    }
    async fn exists(&self) -> Result<bool> {
        (**self).exists().await
    }
    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Blanket impl for `Box<T>`.
#[async_trait]
impl<T: TokenStorage + ?Sized> TokenStorage for Box<T> {
    async fn load(&self) -> Result<Option<StoredCredentials>> {
        (**self).load().await
    }
    async fn save(&self, credentials: &StoredCredentials) -> Result<()> {
        (**self).save(credentials).await
    }
    async fn clear(&self) -> Result<()> {
        (**self).clear().await
    }
    async fn exists(&self) -> Result<bool> {
        (**self).exists().await
    }
    fn name(&self) -> &str {
        (**self).name()
    }
}
