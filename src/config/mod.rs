//! Configuration management for the diary store.
//!
//! This module handles loading and validating configuration settings from environment
//! variables, with sensible defaults. It configures where the encrypted database
//! lives and which keychain service holds its encryption key.
//!
//! # Environment Variables
//!
//! - `DIARY_DATA_DIR`: Directory holding `diary.db` (defaults to ~/.local/share/diary)
//! - `DIARY_VAULT_SERVICE`: Keychain service name (defaults to "diary-store")
//! - `HOME`: Used for expanding the default data directory path

use crate::constants::{
    DB_FILE_NAME, DEFAULT_DATA_SUBDIR, DEFAULT_VAULT_SERVICE, ENV_VAR_DIARY_DATA_DIR,
    ENV_VAR_DIARY_VAULT_SERVICE, ENV_VAR_HOME,
};
use crate::errors::{AppError, AppResult};
use std::env;
use std::fmt;
use std::path::PathBuf;

/// Configuration for the diary store.
///
/// # Examples
///
/// Creating a configuration manually:
/// ```
/// use diary_store::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     data_dir: PathBuf::from("/var/lib/diary"),
///     vault_service: "diary-store".to_string(),
/// };
/// assert_eq!(config.db_path(), PathBuf::from("/var/lib/diary/diary.db"));
/// ```
pub struct Config {
    /// Directory where the encrypted database file is stored.
    ///
    /// Loaded from `DIARY_DATA_DIR` with a fallback to ~/.local/share/diary.
    pub data_dir: PathBuf,

    /// Keychain service name under which the encryption key is stored.
    pub vault_service: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("data_dir", &"[REDACTED_PATH]")
            .field("vault_service", &self.vault_service)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: PathBuf::from(""),
            vault_service: DEFAULT_VAULT_SERVICE.to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables with sensible defaults.
    ///
    /// The data directory is expanded with `shellexpand`, so `~` and
    /// environment variable references are resolved.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if path expansion fails or the resulting
    /// path is empty.
    pub fn load() -> AppResult<Self> {
        let data_dir_str = env::var(ENV_VAR_DIARY_DATA_DIR).unwrap_or_else(|_| {
            let home = env::var(ENV_VAR_HOME).unwrap_or_default();
            format!("{}/{}", home, DEFAULT_DATA_SUBDIR)
        });

        let expanded_path = shellexpand::full(&data_dir_str)
            .map_err(|e| AppError::Config(format!("Failed to expand path: {}", e)))?;
        let data_dir = PathBuf::from(expanded_path.into_owned());

        if data_dir.as_os_str().is_empty() {
            return Err(AppError::Config("Data directory path is empty".to_string()));
        }

        let vault_service = env::var(ENV_VAR_DIARY_VAULT_SERVICE)
            .unwrap_or_else(|_| DEFAULT_VAULT_SERVICE.to_string());

        Ok(Config {
            data_dir,
            vault_service,
        })
    }

    /// Validates that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when the data directory is empty or
    /// relative, or the vault service name is empty or contains whitespace.
    ///
    /// # Examples
    ///
    /// ```
    /// use diary_store::Config;
    /// use std::path::PathBuf;
    ///
    /// let config = Config {
    ///     data_dir: PathBuf::from("relative/dir"),
    ///     vault_service: "diary-store".to_string(),
    /// };
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> AppResult<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(AppError::Config("Data directory path is empty".to_string()));
        }

        if !self.data_dir.is_absolute() {
            return Err(AppError::Config(
                "Data directory must be an absolute path".to_string(),
            ));
        }

        if self.vault_service.is_empty() {
            return Err(AppError::Config("Vault service name is empty".to_string()));
        }

        if self.vault_service.chars().any(char::is_whitespace) {
            return Err(AppError::Config(
                "Vault service name cannot contain whitespace".to_string(),
            ));
        }

        Ok(())
    }

    /// Full path of the encrypted database file.
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }
}
