//! Error handling utilities for the diary store.
//!
//! The store reports failures through [`StoreError`], whose variants mirror the
//! lifecycle of the store: initialization, sequencing, reads and writes. Lower
//! layers (vault, database, content codec) have their own error types that are
//! wrapped as the `source` of a store error. [`AppError`] is the host-level error
//! used by the `diary` binary, together with the convenience alias [`AppResult`].

use std::io;
use thiserror::Error;

/// Represents failures when reading or writing secrets in the vault.
///
/// # Examples
///
/// ```
/// use diary_store::errors::VaultError;
///
/// let error = VaultError::Unavailable("no keychain session".to_string());
/// assert!(format!("{}", error).contains("no keychain session"));
/// ```
#[derive(Debug, Error)]
pub enum VaultError {
    /// The platform keychain rejected the request.
    #[error("Secret vault error: {0}. Please check that the system keychain is unlocked and accessible.")]
    Keyring(#[from] keyring::Error),

    /// The vault cannot be reached at all.
    #[error("Secret vault unavailable: {0}")]
    Unavailable(String),
}

/// Represents specific error cases that can occur during database operations.
///
/// This enum provides detailed, contextual error information for different failure modes
/// when interacting with the encrypted SQLite database.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// SQLite database error.
    #[error("Database error: {0}\n\nIf you're seeing 'file is not a database' or cipher errors, this may indicate:\n- The encryption key in the secret vault no longer matches the database\n- Corrupted database file\n- Incompatible database format")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error.
    #[error("Failed to get connection from pool: {0}")]
    Pool(#[from] r2d2::Error),

    /// The blocking task running the statement panicked or was aborted.
    #[error("Database task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Represents failures when decoding or encoding question/answer content.
///
/// # Examples
///
/// ```
/// use diary_store::errors::ContentError;
///
/// let error = ContentError::InvalidQuestionId(0);
/// assert!(format!("{}", error).contains("0"));
/// ```
#[derive(Debug, Error)]
pub enum ContentError {
    /// The stored content is not a JSON object of answers.
    #[error("Malformed answer content: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Question ids are positive integers.
    #[error("Invalid question id {0}: question ids start at 1")]
    InvalidQuestionId(u32),
}

/// The underlying cause of a failed store initialization.
#[derive(Debug, Error)]
pub enum InitError {
    /// The encryption key could not be read from or written to the vault.
    #[error(transparent)]
    Vault(#[from] VaultError),

    /// The database could not be opened, decrypted or provisioned.
    #[error(transparent)]
    Database(#[from] DatabaseError),

    /// The data directory could not be prepared.
    #[error("Failed to prepare data directory: {0}")]
    Io(#[from] io::Error),
}

/// Errors returned by [`EntryStore`](crate::store::EntryStore) operations.
///
/// Initialization failures are fatal for the session until `init` is retried.
/// Query and write failures are recoverable: callers may retry or report them.
///
/// # Examples
///
/// ```
/// use diary_store::errors::StoreError;
///
/// let error = StoreError::NotInitialized;
/// assert!(format!("{}", error).contains("not initialized"));
/// ```
#[derive(Debug, Error)]
pub enum StoreError {
    /// Vault, database open/decrypt or schema provisioning failed during `init`.
    #[error("Failed to initialize entry store: {0}")]
    Init(#[source] InitError),

    /// An operation was invoked before `init` completed successfully.
    #[error("Entry store is not initialized. Call init() and wait for it to complete first.")]
    NotInitialized,

    /// A read failed.
    #[error("Could not load entries: {0}")]
    Query(#[source] DatabaseError),

    /// An insert, update or delete failed.
    #[error("Could not save changes: {0}")]
    Write(#[source] DatabaseError),

    /// A date key was empty or blank.
    #[error("Invalid date '{0}': dates must be non-empty")]
    InvalidDate(String),

    /// Stored question/answer content could not be decoded.
    #[error("Could not read answers: {0}")]
    Content(#[from] ContentError),
}

impl StoreError {
    /// Returns `true` for failures that may succeed when retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Query(_) | StoreError::Write(_))
    }
}

/// A type alias for `Result<T, StoreError>`.
pub type StoreResult<T> = Result<T, StoreError>;

/// A type alias for `Result<T, DatabaseError>` used by the SQL layer.
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Represents all possible errors surfaced by the `diary` binary.
///
/// # Examples
///
/// Creating a configuration error:
/// ```
/// use diary_store::errors::AppError;
///
/// let error = AppError::Config("Data directory path is empty".to_string());
/// assert_eq!(format!("{}", error), "Configuration error: Data directory path is empty");
/// ```
///
/// Converting from an IO error:
/// ```
/// use diary_store::errors::AppError;
/// use std::io::{self, ErrorKind};
///
/// let io_error = io::Error::new(ErrorKind::NotFound, "file not found");
/// let app_error: AppError = io_error.into();
///
/// match app_error {
///     AppError::Io(inner) => assert_eq!(inner.kind(), ErrorKind::NotFound),
///     _ => panic!("Expected Io variant"),
/// }
/// ```
#[derive(Debug, Error)]
pub enum AppError {
    /// Errors related to configuration loading or validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input/output errors from reading stdin or writing output.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors reported by the entry store.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Invalid user input (dates, answers, empty entries).
    #[error("Invalid input: {0}")]
    Input(String),
}

impl From<ContentError> for AppError {
    fn from(err: ContentError) -> Self {
        AppError::Store(StoreError::Content(err))
    }
}

/// A type alias for `Result<T, AppError>` to simplify function signatures.
pub type AppResult<T> = Result<T, AppError>;
