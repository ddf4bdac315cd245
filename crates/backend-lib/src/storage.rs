// ============================
// parley-backend-lib/src/storage.rs
// ============================
//! Credential store abstraction with a JSON flat-file implementation.
use crate::error::AppError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tokio::fs as tokio_fs;
use tokio::sync::Mutex;
use tracing::warn;

/// One persisted account record, stored under its username key.
/// Field names match the on-disk document layout.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AccountRecord {
    pub fullname: String,
    pub phone_number: String,
    #[serde(rename = "NameinUse")]
    pub name_in_use: String,
    pub hash_password: String,
}

/// Trait for credential store backends
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up one account by username
    async fn get(&self, username: &str) -> Result<Option<AccountRecord>, AppError>;

    /// Create an account. Fails with `Conflict` if the username is taken.
    async fn insert(&self, username: &str, record: AccountRecord) -> Result<(), AppError>;

    /// All known accounts as (username, record) pairs
    async fn list(&self) -> Result<Vec<(String, AccountRecord)>, AppError>;
}

/// Flat-file implementation of the `CredentialStore` trait: a single JSON
/// document keyed by username. Every read-modify-write cycle runs under the
/// lock so racing signups cannot drop each other's records.
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open the store, creating an empty document on first run.
    pub fn new<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            fs::write(&path, "{}")?;
        }
        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    /// Read the full document. Missing, unreadable, or corrupt files degrade
    /// to an empty store rather than failing the request.
    async fn load(&self) -> BTreeMap<String, AccountRecord> {
        let content = match tokio_fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "could not read credential store, treating as empty");
                return BTreeMap::new();
            },
        };

        match serde_json::from_str(&content) {
            Ok(accounts) => accounts,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "could not parse credential store, treating as empty");
                BTreeMap::new()
            },
        }
    }

    async fn save(&self, accounts: &BTreeMap<String, AccountRecord>) -> Result<(), AppError> {
        let json = serde_json::to_string_pretty(accounts)?;
        tokio_fs::write(&self.path, json).await?;
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for JsonFileStore {
    async fn get(&self, username: &str) -> Result<Option<AccountRecord>, AppError> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await.remove(username))
    }

    async fn insert(&self, username: &str, record: AccountRecord) -> Result<(), AppError> {
        let _guard = self.lock.lock().await;
        let mut accounts = self.load().await;

        if accounts.contains_key(username) {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }

        accounts.insert(username.to_string(), record);
        self.save(&accounts).await
    }

    async fn list(&self) -> Result<Vec<(String, AccountRecord)>, AppError> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await.into_iter().collect())
    }
}
