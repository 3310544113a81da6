//! Credentials, their storage, and session renewal.

pub mod credentials;
pub mod refresh;
pub mod session;
pub mod store;

pub use credentials::{CredentialPair, StoredCredentials};
pub use session::{RenewalError, SessionManager};
pub use store::{FileTokenStorage, MemoryTokenStorage, TokenStorage};

#[cfg(feature = "system-keyring")]
pub use store::KeyringTokenStorage;
