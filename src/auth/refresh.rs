//! Refresh-token exchange.

use serde::Serialize;
use tracing::{debug, info};

use crate::auth::credentials::CredentialPair;
use crate::error::{ApiError, RefreshError};
use crate::net::request::RequestDescriptor;
use crate::net::transport::Transport;

/// Path of the token renewal endpoint.
pub const REFRESH_PATH: &str = "/auth/refresh-token";

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// Exchange a refresh token for a new credential pair.
///
/// POST `/auth/refresh-token`
/// Body: `{"refresh_token": "..."}`
///
/// Sent without an `Authorization` header and never intercepted, so a 401
/// here cannot trigger another refresh.
pub async fn refresh_token(
    transport: &dyn Transport,
    refresh_token: &str,
) -> Result<CredentialPair, RefreshError> {
    info!("Refreshing access token...");

    let request = RequestDescriptor::post(REFRESH_PATH)
        .json(&RefreshRequest { refresh_token })
        .map_err(|e| RefreshError::Transport(e.to_string()))?;

    let response = transport.send(&request, None).await.map_err(|e| match e {
        ApiError::Timeout => RefreshError::Transport("request timed out".into()),
        other => RefreshError::Transport(other.to_string()),
    })?;

    if !response.is_success() {
        return Err(RefreshError::Rejected {
            status: response.status().as_u16(),
            detail: response.detail(),
        });
    }

    let pair: CredentialPair = response
        .json()
        .map_err(|e| RefreshError::InvalidResponse(e.to_string()))?;

    if pair.access_token.is_empty() {
        return Err(RefreshError::InvalidResponse(
            "Response does not contain access_token".into(),
        ));
    }
    if pair.refresh_token.is_empty() {
        return Err(RefreshError::InvalidResponse(
            "Response does not contain refresh_token".into(),
        ));
    }

    debug!("Access token refreshed");
    Ok(pair)
}
