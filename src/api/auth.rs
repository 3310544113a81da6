//! `/auth/*` endpoints.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::credentials::CredentialPair;
use crate::client::WishflickClient;
use crate::error::{ApiError, Result};
use crate::net::request::RequestDescriptor;

/// Profile visibility chosen at registration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Privacy {
    #[default]
    Public,
    Friends,
    Private,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterData {
    pub email: String,
    pub password: String,
    pub name: String,
    pub privacy: Privacy,
}

#[derive(Deserialize)]
struct GuestToken {
    access_token: String,
}

/// Login, registration and logout.
pub struct AuthApi<'a> {
    client: &'a WishflickClient,
}

impl<'a> AuthApi<'a> {
    pub(crate) fn new(client: &'a WishflickClient) -> Self {
        Self { client }
    }

    /// Password login. Persists the issued token pair.
    pub async fn login(&self, email: &str, password: &str) -> Result<CredentialPair> {
        let request =
            RequestDescriptor::post("/auth/token").form([("username", email), ("password", password)]);
        let pair: CredentialPair = self.client.call_public(request).await?;
        if !pair.is_complete() {
            return Err(ApiError::Decode("login response is missing a token".into()).into());
        }

        self.client.session().establish(&pair).await?;
        info!("Logged in");
        Ok(pair)
    }

    /// Create an account. The backend then expects [`verify_email`](Self::verify_email).
    pub async fn register(&self, data: &RegisterData) -> Result<serde_json::Value> {
        self.client
            .call_public(RequestDescriptor::post("/auth/register").json(data)?)
            .await
    }

    pub async fn verify_email(&self, email: &str, code: &str) -> Result<serde_json::Value> {
        let body = serde_json::json!({ "email": email, "code": code });
        self.client
            .call_public(RequestDescriptor::post("/auth/verify-email").json(&body)?)
            .await
    }

    /// Guest session. Only an access token is issued, so it ends at the
    /// first 401.
    pub async fn guest_login(&self) -> Result<String> {
        let token: GuestToken = self
            .client
            .call_public(RequestDescriptor::post("/auth/guest-register"))
            .await?;
        if token.access_token.is_empty() {
            return Err(ApiError::Decode("guest response is missing access_token".into()).into());
        }

        self.client.session().establish_guest(&token.access_token).await?;
        info!("Guest session started");
        Ok(token.access_token)
    }

    /// Forget both tokens.
    pub async fn logout(&self) -> Result<()> {
        self.client.session().end().await
    }
}
