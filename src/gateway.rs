//! Authenticated request gateway.
//!
//! Every backend call goes through [`Gateway::request`]. It attaches the
//! stored access token, and on a 401 renews the session once and replays
//! the request with the new token. Other responses are handed back as-is.

use std::sync::Arc;

use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::auth::credentials::CredentialPair;
use crate::auth::refresh;
use crate::auth::session::{RenewalError, SessionManager};
use crate::error::{Error, RefreshError, Result};
use crate::net::request::{ApiResponse, RequestDescriptor};
use crate::net::transport::Transport;

#[derive(Clone)]
pub struct Gateway {
    transport: Arc<dyn Transport>,
    session: Arc<SessionManager>,
}

impl Gateway {
    pub fn new(transport: Arc<dyn Transport>, session: Arc<SessionManager>) -> Self {
        Self { transport, session }
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    /// Send an authenticated request.
    ///
    /// Returns every non-401 response unchanged, whatever its status.
    /// A 401 is answered by renewing the session and replaying the request
    /// exactly once.
    ///
    /// # Errors
    /// - [`Error::Api`] on connection failure or timeout (never refreshed)
    /// - [`Error::Auth`] if the replay is also rejected, or no refresh token
    ///   is stored
    /// - [`Error::Refresh`] if the refresh call failed; the store is cleared
    pub async fn request(&self, mut request: RequestDescriptor) -> Result<ApiResponse> {
        let token = self.session.access_token().await?;
        debug!(
            method = %request.method,
            path = %request.path,
            authenticated = token.is_some(),
            "Dispatching request"
        );
        let response = self.transport.send(&request, token.as_deref()).await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        if request.is_retried() {
            warn!(path = %request.path, "Request rejected again after token refresh");
            return Err(Error::Auth {
                detail: response.detail(),
            });
        }

        debug!(path = %request.path, "Access token rejected, renewing session");
        let renewed = self
            .session
            .renew(|refresh_token| async move { self.refresh(&refresh_token).await })
            .await;

        let token = match renewed {
            Ok(token) => token,
            Err(RenewalError::NoRefreshToken) => {
                return Err(Error::Auth {
                    detail: response.detail(),
                });
            }
            Err(RenewalError::Refresh(e)) => return Err(Error::Refresh(e)),
            Err(RenewalError::Storage(message)) => return Err(Error::Storage(message)),
        };

        request.mark_retried();
        let retry = self.transport.send(&request, Some(&token)).await?;
        if retry.status() == StatusCode::UNAUTHORIZED {
            warn!(path = %request.path, "Request rejected again after token refresh");
            return Err(Error::Auth {
                detail: retry.detail(),
            });
        }
        Ok(retry)
    }

    /// Exchange `refresh_token` for a new pair. Bypasses interception.
    pub async fn refresh(
        &self,
        refresh_token: &str,
    ) -> std::result::Result<CredentialPair, RefreshError> {
        refresh::refresh_token(self.transport.as_ref(), refresh_token).await
    }

    /// Send without credentials and without 401 handling (`/auth/*`).
    pub async fn request_public(&self, request: &RequestDescriptor) -> Result<ApiResponse> {
        debug!(method = %request.method, path = %request.path, "Dispatching public request");
        Ok(self.transport.send(request, None).await?)
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("transport", &self.transport.name())
            .field("session", &self.session)
            .finish()
    }
}
