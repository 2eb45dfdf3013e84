//! Secret vault access for the database encryption key.
//!
//! The key lives outside the database in a small secret store. The platform
//! keychain is used in normal operation; [`MemoryVault`] keeps secrets in the
//! process for tests and non-interactive runs.

use crate::errors::VaultError;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info};
use uuid::Uuid;
use zeroize::Zeroizing;

/// Minimal get/set interface over a secure credential store.
pub trait SecretVault: Send + Sync {
    /// Reads a secret, returning `None` when nothing is stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, VaultError>;

    /// Stores a secret under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), VaultError>;
}

/// Vault backed by the operating system keychain.
#[derive(Debug, Clone)]
pub struct KeyringVault {
    service: String,
}

impl KeyringVault {
    /// Creates a vault whose entries are grouped under `service`.
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: &str) -> Result<keyring::Entry, VaultError> {
        Ok(keyring::Entry::new(&self.service, key)?)
    }
}

impl SecretVault for KeyringVault {
    fn get(&self, key: &str) -> Result<Option<String>, VaultError> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), VaultError> {
        self.entry(key)?.set_password(value)?;
        Ok(())
    }
}

/// In-process vault.
///
/// Clones share the same secrets, so a clone handed to a second store behaves
/// like the same keychain seen by a restarted process.
///
/// # Examples
///
/// ```
/// use diary_store::vault::{MemoryVault, SecretVault};
///
/// let vault = MemoryVault::new();
/// let shared = vault.clone();
/// vault.set("db_encryption_key", "k").unwrap();
/// assert_eq!(shared.get("db_encryption_key").unwrap().as_deref(), Some("k"));
/// ```
#[derive(Clone, Default)]
pub struct MemoryVault {
    secrets: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryVault {
    /// Creates an empty vault.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a vault already holding one secret.
    pub fn with_secret(key: &str, value: &str) -> Self {
        let vault = Self::new();
        vault
            .secrets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        vault
    }

    /// Forgets every stored secret.
    pub fn clear(&self) {
        self.secrets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl fmt::Debug for MemoryVault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self
            .secrets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        f.debug_struct("MemoryVault").field("secrets", &count).finish()
    }
}

impl SecretVault for MemoryVault {
    fn get(&self, key: &str) -> Result<Option<String>, VaultError> {
        Ok(self
            .secrets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), VaultError> {
        self.secrets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Returns the encryption key stored under `key_name`, creating it first if needed.
///
/// A new key is a random UUID v4 (122 bits of entropy) and is written to the
/// vault before it is returned, so it is never used without being persisted.
///
/// # Errors
///
/// Returns an error if the vault cannot be read or written.
pub fn load_or_create_key(
    vault: &dyn SecretVault,
    key_name: &str,
) -> Result<Zeroizing<String>, VaultError> {
    if let Some(existing) = vault.get(key_name)? {
        if !existing.is_empty() {
            debug!("Using existing encryption key from vault");
            return Ok(Zeroizing::new(existing));
        }
    }

    let key = Zeroizing::new(Uuid::new_v4().to_string());
    vault.set(key_name, &key)?;
    info!("Generated new database encryption key");
    Ok(key)
}
