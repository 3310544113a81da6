//! Client facade: the one object UI code talks to.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::info;

use crate::api::{
    AuthApi, CommunitiesApi, CommunityChatApi, FriendsApi, LikesApi, NotificationsApi, UsersApi,
    WishesApi,
};
use crate::auth::session::SessionManager;
use crate::auth::store::{FileTokenStorage, MemoryTokenStorage, TokenStorage};
use crate::config::{ApiConfig, Config, StorageBackend};
use crate::error::{Error, Result};
use crate::gateway::Gateway;
use crate::net::client::HttpClient;
use crate::net::request::{ApiResponse, RequestDescriptor};
use crate::net::transport::{ReqwestTransport, Transport};

/// Authenticated WishFlick API client.
///
/// Cheap to clone; clones share the session, so a refresh started by one
/// clone is joined by requests from the others.
#[derive(Debug, Clone)]
pub struct WishflickClient {
    gateway: Gateway,
}

impl WishflickClient {
    pub fn builder() -> WishflickClientBuilder {
        WishflickClientBuilder::default()
    }

    /// Build a client from loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let storage: Arc<dyn TokenStorage> = match config.storage.backend {
            StorageBackend::File => Arc::new(FileTokenStorage::new(config.storage.path.clone())),
            StorageBackend::Memory => Arc::new(MemoryTokenStorage::new()),
            #[cfg(feature = "system-keyring")]
            StorageBackend::Keyring => Arc::new(crate::auth::store::KeyringTokenStorage::new()),
            #[cfg(not(feature = "system-keyring"))]
            StorageBackend::Keyring => {
                return Err(Error::Config(
                    "storage.backend = \"keyring\" requires the `system-keyring` feature".into(),
                ));
            }
        };

        info!(
            base_url = %config.api.base_url,
            storage = storage.name(),
            "Client configured"
        );

        Self::builder()
            .base_url(&config.api.base_url)
            .http(HttpClient::from_config(&config.api)?)
            .storage(storage)
            .build()
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        self.gateway.session()
    }

    /// Send through the gateway and return the raw response, whatever its
    /// status.
    pub async fn request(&self, request: RequestDescriptor) -> Result<ApiResponse> {
        self.gateway.request(request).await
    }

    /// Send through the gateway and decode a 2xx JSON body.
    ///
    /// Non-2xx responses become [`ApiError::Status`](crate::error::ApiError::Status)
    /// with the backend's `detail`.
    pub async fn call<T: DeserializeOwned>(&self, request: RequestDescriptor) -> Result<T> {
        let response = self.gateway.request(request).await?.error_for_status()?;
        Ok(response.json()?)
    }

    /// Like [`call`](Self::call) for endpoints whose body is not needed.
    pub async fn call_empty(&self, request: RequestDescriptor) -> Result<()> {
        self.gateway.request(request).await?.error_for_status()?;
        Ok(())
    }

    /// Unauthenticated call, no 401 handling.
    pub async fn call_public<T: DeserializeOwned>(&self, request: RequestDescriptor) -> Result<T> {
        let response = self
            .gateway
            .request_public(&request)
            .await?
            .error_for_status()?;
        Ok(response.json()?)
    }

    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    pub fn notifications(&self) -> NotificationsApi<'_> {
        NotificationsApi::new(self)
    }

    pub fn friends(&self) -> FriendsApi<'_> {
        FriendsApi::new(self)
    }

    pub fn wishes(&self) -> WishesApi<'_> {
        WishesApi::new(self)
    }

    pub fn likes(&self) -> LikesApi<'_> {
        LikesApi::new(self)
    }

    pub fn users(&self) -> UsersApi<'_> {
        UsersApi::new(self)
    }

    pub fn communities(&self) -> CommunitiesApi<'_> {
        CommunitiesApi::new(self)
    }

    pub fn community_chat(&self) -> CommunityChatApi<'_> {
        CommunityChatApi::new(self)
    }
}

/// Builder for [`WishflickClient`].
#[derive(Default)]
pub struct WishflickClientBuilder {
    base_url: Option<String>,
    http: Option<HttpClient>,
    storage: Option<Arc<dyn TokenStorage>>,
    transport: Option<Arc<dyn Transport>>,
}

impl WishflickClientBuilder {
    /// API root, e.g. `https://api.wishflick.app`.
    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = Some(url.to_string());
        self
    }

    pub fn http(mut self, client: HttpClient) -> Self {
        self.http = Some(client);
        self
    }

    /// Token storage backend. Defaults to in-memory.
    pub fn storage(mut self, storage: Arc<dyn TokenStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Replace the HTTP transport entirely. `base_url` and `http` are then
    /// ignored.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> Result<WishflickClient> {
        let transport: Arc<dyn Transport> = match self.transport {
            Some(t) => t,
            None => {
                let base_url = self
                    .base_url
                    .unwrap_or_else(|| ApiConfig::default().base_url);
                let http = match self.http {
                    Some(http) => http,
                    None => HttpClient::new()?,
                };
                Arc::new(ReqwestTransport::new(http, &base_url)?)
            }
        };
        let storage = self
            .storage
            .unwrap_or_else(|| Arc::new(MemoryTokenStorage::new()));
        let session = Arc::new(SessionManager::new(storage));

        Ok(WishflickClient {
            gateway: Gateway::new(transport, session),
        })
    }
}

impl std::fmt::Debug for WishflickClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WishflickClientBuilder")
            .field("base_url", &self.base_url)
            .field("storage", &self.storage.as_ref().map(|s| s.name().to_string()))
            .field("custom_transport", &self.transport.is_some())
            .finish()
    }
}
