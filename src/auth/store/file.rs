//! File-based token storage.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

use super::TokenStorage;
use crate::auth::credentials::StoredCredentials;
use crate::error::{Error, Result};

/// File permissions for the credentials file (Unix only): owner read/write.
#[cfg(unix)]
const FILE_MODE: u32 = 0o600;

/// Directory permissions (Unix only): owner read/write/execute.
#[cfg(unix)]
const DIR_MODE: u32 = 0o700;

/// File-based token storage.
///
/// Stores the credentials as one JSON object with the keys `access_token`
/// and `refresh_token`.
///
/// # Security
/// - File permissions are set to 0600 (owner read/write only) on Unix
/// - Parent directories are created with 0700 permissions
///
/// Writes go to a sibling temp file, created 0600 and synced, that is
/// renamed over the target, so a concurrent reader sees either the old pair
/// or the new one.
#[derive(Debug, Clone)]
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    /// Create storage at the specified path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the credentials file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "credentials.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Ensure the parent directory exists with correct permissions.
    fn ensure_dir(&self) -> Result<()> {
        let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) else {
            return Ok(());
        };
        if !dir.exists() {
            std::fs::create_dir_all(dir).map_err(|e| Error::storage_io(dir, e.to_string()))?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let perms = std::fs::Permissions::from_mode(DIR_MODE);
                std::fs::set_permissions(dir, perms)
                    .map_err(|e| Error::storage_io(dir, format!("chmod: {e}")))?;
            }
        }
        Ok(())
    }

    fn read(&self) -> Result<Option<StoredCredentials>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::storage_io(&self.path, e.to_string())),
        };

        if content.trim().is_empty() {
            return Ok(None);
        }

        let credentials: StoredCredentials = serde_json::from_str(&content).map_err(|e| {
            Error::Storage(format!(
                "Failed to parse credentials file '{}': {}",
                self.path.display(),
                e
            ))
        })?;
        Ok(Some(credentials))
    }

    fn write(&self, credentials: &StoredCredentials) -> Result<()> {
        self.ensure_dir()?;

        let content = serde_json::to_string_pretty(credentials)?;
        let tmp = self.tmp_path();

        // Created 0600. A leftover temp file is replaced, not reopened.
        #[cfg(unix)]
        {
            use std::io::Write;
            use std::os::unix::fs::OpenOptionsExt;

            match std::fs::remove_file(&tmp) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(Error::storage_io(&tmp, e.to_string())),
            }
            let mut file = std::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .mode(FILE_MODE)
                .open(&tmp)
                .map_err(|e| Error::storage_io(&tmp, format!("create: {e}")))?;
            file.write_all(content.as_bytes())
                .map_err(|e| Error::storage_io(&tmp, format!("write: {e}")))?;
            file.sync_all()
                .map_err(|e| Error::storage_io(&tmp, format!("sync: {e}")))?;
        }

        #[cfg(not(unix))]
        std::fs::write(&tmp, &content).map_err(|e| Error::storage_io(&tmp, e.to_string()))?;

        if let Err(e) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(Error::storage_io(&self.path, format!("rename: {e}")));
        }

        debug!(path = %self.path.display(), "Credentials saved");
        Ok(())
    }
}

#[async_trait]
impl TokenStorage for FileTokenStorage {
    #[instrument(skip(self))]
    async fn load(&self) -> Result<Option<StoredCredentials>> {
        self.read()
    }

    #[instrument(skip(self, credentials))]
    async fn save(&self, credentials: &StoredCredentials) -> Result<()> {
        self.write(credentials)
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "Credentials removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::storage_io(&self.path, e.to_string())),
        }
    }

    fn name(&self) -> &str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::credentials::CredentialPair;

    #[tokio::test]
    async fn test_file_load_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileTokenStorage::new(dir.path().join("credentials.json"));
        assert!(storage.load().await.unwrap().is_none());
        assert!(!storage.exists().await.unwrap());
    }

    #[tokio::test]
    async fn test_file_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileTokenStorage::new(dir.path().join("nested").join("credentials.json"));

        storage
            .save(&CredentialPair::new("access", "refresh").into())
            .await
            .unwrap();

        let loaded = storage.load().await.unwrap().unwrap();
        assert_eq!(loaded.access_token.as_deref(), Some("access"));
        assert_eq!(loaded.refresh_token.as_deref(), Some("refresh"));
        assert!(!storage.tmp_path().exists());

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(storage.path()).unwrap()).unwrap();
        assert_eq!(raw["access_token"], "access");
        assert_eq!(raw["refresh_token"], "refresh");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let storage = FileTokenStorage::new(dir.path().join("sub").join("credentials.json"));
        storage
            .save(&StoredCredentials::access_only("guest"))
            .await
            .unwrap();

        let mode = std::fs::metadata(storage.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, FILE_MODE);
        let dir_mode = std::fs::metadata(dir.path().join("sub"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(dir_mode & 0o777, DIR_MODE);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stale_temp_file_does_not_leak_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let storage = FileTokenStorage::new(dir.path().join("credentials.json"));
        std::fs::write(storage.tmp_path(), "stale").unwrap();
        std::fs::set_permissions(storage.tmp_path(), std::fs::Permissions::from_mode(0o644))
            .unwrap();

        storage
            .save(&CredentialPair::new("a", "r").into())
            .await
            .unwrap();

        assert!(!storage.tmp_path().exists());
        let mode = std::fs::metadata(storage.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, FILE_MODE);
        let loaded = storage.load().await.unwrap().unwrap();
        assert_eq!(loaded.access_token.as_deref(), Some("a"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failed_rename_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory at the target path makes the rename fail.
        let target = dir.path().join("credentials.json");
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("keep"), "x").unwrap();
        let storage = FileTokenStorage::new(target);

        let err = storage
            .save(&CredentialPair::new("a", "r").into())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::StorageIo { .. }));
        assert!(!storage.tmp_path().exists());
    }

    #[tokio::test]
    async fn test_file_clear() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileTokenStorage::new(dir.path().join("credentials.json"));
        storage
            .save(&CredentialPair::new("a", "r").into())
            .await
            .unwrap();
        storage.clear().await.unwrap();
        assert!(storage.load().await.unwrap().is_none());
        // Clearing twice is fine.
        storage.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_file_corrupt_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, "{not json").unwrap();
        let storage = FileTokenStorage::new(path);
        assert!(matches!(storage.load().await, Err(Error::Storage(_))));
    }
}
