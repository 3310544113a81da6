//! Session lifecycle and single-flight token renewal.
//!
//! At most one refresh is in flight per [`SessionManager`]. Callers that
//! need a new token while a refresh is running are parked in a FIFO queue
//! and all receive the outcome of that one refresh.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::auth::credentials::{CredentialPair, StoredCredentials};
use crate::auth::store::TokenStorage;
use crate::error::{RefreshError, Result};

/// Why a renewal produced no token.
///
/// `Clone` because one outcome is fanned out to every queued caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenewalError {
    /// The store holds no refresh token; no refresh call was made.
    #[error("No refresh token stored")]
    NoRefreshToken,

    /// The refresh call failed. Stored credentials have been cleared.
    #[error(transparent)]
    Refresh(RefreshError),

    /// The stored credentials could not be read.
    #[error("Storage error: {0}")]
    Storage(String),
}

type Outcome = std::result::Result<String, RenewalError>;

#[derive(Default)]
struct RefreshState {
    refreshing: bool,
    waiters: VecDeque<oneshot::Sender<Outcome>>,
}

/// Owns the stored credentials and the renewal state of one session.
pub struct SessionManager {
    storage: Arc<dyn TokenStorage>,
    state: Mutex<RefreshState>,
}

impl SessionManager {
    pub fn new(storage: Arc<dyn TokenStorage>) -> Self {
        Self {
            storage,
            state: Mutex::new(RefreshState::default()),
        }
    }

    /// The storage backend behind this session.
    pub fn storage(&self) -> &Arc<dyn TokenStorage> {
        &self.storage
    }

    /// Persist a freshly issued pair (login).
    pub async fn establish(&self, pair: &CredentialPair) -> Result<()> {
        self.storage.save(&pair.into()).await?;
        info!(backend = self.storage.name(), "Session established");
        Ok(())
    }

    /// Persist a guest access token. Guest sessions cannot be renewed.
    pub async fn establish_guest(&self, access_token: &str) -> Result<()> {
        self.storage
            .save(&StoredCredentials::access_only(access_token))
            .await?;
        info!(backend = self.storage.name(), "Guest session established");
        Ok(())
    }

    /// Remove both tokens (logout).
    pub async fn end(&self) -> Result<()> {
        self.storage.clear().await?;
        info!(backend = self.storage.name(), "Session ended");
        Ok(())
    }

    pub async fn credentials(&self) -> Result<Option<StoredCredentials>> {
        self.storage.load().await
    }

    /// Current access token, if one is stored.
    pub async fn access_token(&self) -> Result<Option<String>> {
        Ok(self
            .storage
            .load()
            .await?
            .and_then(|c| c.access_token)
            .filter(|t| !t.is_empty()))
    }

    /// Whether a refresh is currently in flight.
    pub fn is_refreshing(&self) -> bool {
        self.lock().refreshing
    }

    /// Number of callers parked behind the in-flight refresh.
    pub fn queued(&self) -> usize {
        self.lock().waiters.len()
    }

    /// Obtain a renewed access token.
    ///
    /// The first caller runs `refresh` with the stored refresh token; callers
    /// arriving while it runs wait for its outcome instead of refreshing
    /// again. On success the new pair is persisted before anyone is
    /// resumed. On failure the store is cleared.
    pub async fn renew<F, Fut>(&self, refresh: F) -> Outcome
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = std::result::Result<CredentialPair, RefreshError>>,
    {
        let waiter = {
            let mut state = self.lock();
            if state.refreshing {
                let (tx, rx) = oneshot::channel();
                state.waiters.push_back(tx);
                Some(rx)
            } else {
                state.refreshing = true;
                None
            }
        };

        if let Some(rx) = waiter {
            debug!("Refresh in flight, queued");
            return rx
                .await
                .unwrap_or(Err(RenewalError::Refresh(RefreshError::Abandoned)));
        }

        let mut flight = Flight {
            session: self,
            settled: false,
        };
        let outcome = self.run_refresh(refresh).await;
        flight.settle(outcome.clone());
        outcome
    }

    async fn run_refresh<F, Fut>(&self, refresh: F) -> Outcome
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = std::result::Result<CredentialPair, RefreshError>>,
    {
        let stored = self
            .storage
            .load()
            .await
            .map_err(|e| RenewalError::Storage(e.to_string()))?;

        let Some(refresh_token) = stored
            .and_then(|c| c.refresh_token)
            .filter(|t| !t.is_empty())
        else {
            debug!("No refresh token stored, cannot renew");
            return Err(RenewalError::NoRefreshToken);
        };

        match refresh(refresh_token).await {
            Ok(pair) => {
                if let Err(e) = self.storage.save(&(&pair).into()).await {
                    warn!("Failed to persist token: {}", e);
                }
                info!("Access token renewed");
                Ok(pair.access_token)
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed, clearing stored credentials");
                if let Err(clear_err) = self.storage.clear().await {
                    warn!("Failed to clear credentials: {}", clear_err);
                }
                Err(RenewalError::Refresh(e))
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, RefreshState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("SessionManager")
            .field("storage", &self.storage.name())
            .field("refreshing", &state.refreshing)
            .field("queued", &state.waiters.len())
            .finish()
    }
}

/// Held by the caller driving a refresh. Releases the flag and resumes the
/// queue even if that caller is dropped mid-refresh.
struct Flight<'a> {
    session: &'a SessionManager,
    settled: bool,
}

impl Flight<'_> {
    fn settle(&mut self, outcome: Outcome) {
        self.settled = true;
        let waiters = {
            let mut state = self.session.lock();
            state.refreshing = false;
            std::mem::take(&mut state.waiters)
        };
        if !waiters.is_empty() {
            debug!(count = waiters.len(), "Resuming queued requests");
        }
        for tx in waiters {
            // Receiver gone means that caller was cancelled.
            let _ = tx.send(outcome.clone());
        }
    }
}

impl Drop for Flight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!("Token refresh abandoned");
            self.settle(Err(RenewalError::Refresh(RefreshError::Abandoned)));
        }
    }
}
