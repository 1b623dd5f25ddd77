use std::{
    path::{Path, PathBuf},
    sync::RwLock,
};

use chrono::Utc;

use crate::{
    error::{CacheMiss, TokenStoreError},
    types::Credential,
};

/// Durable record of the one credential this process uses.
pub struct TokenStore {
    path: PathBuf,
    current: RwLock<Option<Credential>>,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            current: RwLock::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the cached credential.
    ///
    /// An absent file, a file that does not parse, and a credential whose
    /// expiry lies in the past all report [`TokenStoreError::NotFound`]; the
    /// caller falls back to the interactive authorization flow.
    pub async fn load(&self) -> Result<Credential, TokenStoreError> {
        let content = async_fs::read_to_string(&self.path)
            .await
            .map_err(|_| TokenStoreError::NotFound(CacheMiss::Absent))?;
        let credential: Credential = serde_json::from_str(&content)
            .map_err(|_| TokenStoreError::NotFound(CacheMiss::Unparsable))?;

        if credential.is_expired_at(Utc::now().timestamp_millis()) {
            return Err(TokenStoreError::NotFound(CacheMiss::Expired));
        }

        self.remember(&credential);
        Ok(credential)
    }

    pub async fn save(&self, credential: &Credential) -> Result<(), TokenStoreError> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(credential)?;
        async_fs::write(&self.path, json).await?;

        self.remember(credential);
        Ok(())
    }

    /// Last credential saved or loaded by this process, without touching disk.
    pub fn current(&self) -> Option<Credential> {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn remember(&self, credential: &Credential) {
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Some(credential.clone());
    }
}
