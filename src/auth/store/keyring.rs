//! System keyring-based token storage (feature-gated).

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::TokenStorage;
use crate::auth::credentials::StoredCredentials;
use crate::error::{Error, Result};

/// Token storage using the system keyring (Secret Service / Keychain / Credential Manager).
///
/// The credentials record is serialized to JSON and kept in a single
/// keyring entry, so both tokens are replaced together.
#[derive(Debug, Clone)]
pub struct KeyringTokenStorage {
    service: String,
    account: String,
}

impl Default for KeyringTokenStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyringTokenStorage {
    const SERVICE_NAME: &str = "wishflick";
    const ACCOUNT: &str = "session";

    /// Create a keyring storage with the default service name.
    pub fn new() -> Self {
        Self::with_service(Self::SERVICE_NAME)
    }

    /// Create a keyring storage with a custom service name.
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            account: Self::ACCOUNT.to_string(),
        }
    }

    fn entry(&self) -> Result<keyring::Entry> {
        keyring::Entry::new(&self.service, &self.account)
            .map_err(|e| Error::Storage(format!("Failed to create keyring entry: {e}")))
    }
}

#[async_trait]
impl TokenStorage for KeyringTokenStorage {
    #[instrument(skip(self))]
    async fn load(&self) -> Result<Option<StoredCredentials>> {
        match self.entry()?.get_password() {
            Ok(json) => {
                let credentials: StoredCredentials = serde_json::from_str(&json).map_err(|e| {
                    Error::Storage(format!("Failed to parse credentials from keyring: {e}"))
                })?;
                debug!("Credentials loaded from keyring");
                Ok(Some(credentials))
            }
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(Error::Storage(format!("Keyring error: {e}"))),
        }
    }

    #[instrument(skip(self, credentials))]
    async fn save(&self, credentials: &StoredCredentials) -> Result<()> {
        let json = serde_json::to_string(credentials)?;
        self.entry()?
            .set_password(&json)
            .map_err(|e| Error::Storage(format!("Keyring error: {e}")))?;
        debug!("Credentials saved to keyring");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<()> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(Error::Storage(format!("Keyring error: {e}"))),
        }
    }

    fn name(&self) -> &str {
        "keyring"
    }
}
