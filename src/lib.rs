//! Authenticated client for the WishFlick API.
//!
//! All calls go through one [`Gateway`] that attaches the stored access
//! token and transparently renews it on a 401. Concurrent requests that hit
//! an expired token share a single refresh.
//!
//! ```no_run
//! # async fn demo() -> wishflick_client::Result<()> {
//! use std::sync::Arc;
//! use wishflick_client::WishflickClient;
//! use wishflick_client::auth::FileTokenStorage;
//!
//! let client = WishflickClient::builder()
//!     .base_url("https://api.wishflick.app")
//!     .storage(Arc::new(FileTokenStorage::new("credentials.json")))
//!     .build()?;
//!
//! client.auth().login("ann@example.com", "hunter2").await?;
//! let wishes = client.wishes().mine().await?;
//! # let _ = wishes;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod gateway;
pub mod net;

pub use client::{WishflickClient, WishflickClientBuilder};
pub use error::{ApiError, Error, RefreshError, Result};
pub use gateway::Gateway;
