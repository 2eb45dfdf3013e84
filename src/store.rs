//! The entry store: an encrypted, single-table diary database.
//!
//! [`EntryStore`] owns the lifecycle `Uninitialized → Initializing → Ready`.
//! `init` provisions the encryption key through a [`SecretVault`], opens the
//! SQLCipher database and creates the schema. Every other operation requires
//! a ready store and fails with [`StoreError::NotInitialized`] otherwise.
//!
//! Operations are async. Keychain and SQLite calls are blocking, so they run on
//! tokio's blocking pool against the store's single connection.
//!
//! # Example
//!
//! ```no_run
//! use diary_store::store::EntryStore;
//! use diary_store::vault::MemoryVault;
//! use diary_store::EntryMode;
//! use std::sync::Arc;
//!
//! # async fn demo() -> diary_store::errors::StoreResult<()> {
//! let store = EntryStore::new("/tmp/diary/diary.db", Arc::new(MemoryVault::new()));
//! store.init().await?;
//! store.set_entry("2024-01-01", EntryMode::Free, "New year, new notebook").await?;
//! let entry = store.get_entry("2024-01-01", EntryMode::Free).await?;
//! assert!(entry.is_some());
//! # Ok(())
//! # }
//! ```

use crate::config::Config;
use crate::constants::{DB_ENCRYPTION_KEY_NAME, ENV_VAR_DIARY_TEST_KEY};
use crate::db::{entries, Database};
use crate::errors::{DatabaseError, DatabaseResult, InitError, StoreError, StoreResult};
use crate::model::{DiaryEntry, EntryMode};
use crate::qa::QaAnswers;
use crate::vault::{self, KeyringVault, MemoryVault, SecretVault};
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Observable lifecycle state of an [`EntryStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreStatus {
    Uninitialized,
    Initializing,
    Ready,
}

enum State {
    Uninitialized,
    Initializing,
    Ready(Database),
}

/// Encrypted diary entry store keyed by `(date, mode)`.
///
/// Construct one per process and share it by reference (or `Arc`).
pub struct EntryStore {
    db_path: PathBuf,
    key_name: String,
    vault: Arc<dyn SecretVault>,
    state: Arc<RwLock<State>>,
    init_gate: Arc<Mutex<()>>,
}

impl EntryStore {
    /// Creates an uninitialized store for the database file at `db_path`.
    pub fn new(db_path: impl Into<PathBuf>, vault: Arc<dyn SecretVault>) -> Self {
        Self {
            db_path: db_path.into(),
            key_name: DB_ENCRYPTION_KEY_NAME.to_string(),
            vault,
            state: Arc::new(RwLock::new(State::Uninitialized)),
            init_gate: Arc::new(Mutex::new(())),
        }
    }

    /// Creates a store from configuration.
    ///
    /// Uses the platform keychain, unless `DIARY_TEST_ENCRYPTION_KEY` is set,
    /// in which case that key is served from an in-memory vault.
    pub fn from_config(config: &Config) -> Self {
        let vault: Arc<dyn SecretVault> = match std::env::var(ENV_VAR_DIARY_TEST_KEY) {
            Ok(test_key) => {
                debug!("Using {} for non-interactive testing", ENV_VAR_DIARY_TEST_KEY);
                Arc::new(MemoryVault::with_secret(DB_ENCRYPTION_KEY_NAME, &test_key))
            }
            Err(_) => Arc::new(KeyringVault::new(config.vault_service.clone())),
        };
        Self::new(config.db_path(), vault)
    }

    /// Path of the database file.
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Current lifecycle state.
    pub fn status(&self) -> StoreStatus {
        match &*self.state.read().unwrap_or_else(PoisonError::into_inner) {
            State::Uninitialized => StoreStatus::Uninitialized,
            State::Initializing => StoreStatus::Initializing,
            State::Ready(_) => StoreStatus::Ready,
        }
    }

    /// Initializes the store.
    ///
    /// Loads (or generates and saves) the encryption key, opens the encrypted
    /// database and provisions the schema. Calling `init` on a ready store is a
    /// no-op; concurrent calls are serialized so key creation and DDL run once.
    /// If initialization fails, or the returned future is dropped before it
    /// completes, the store goes back to `Uninitialized` and `init` may be retried.
    /// The blocking work of a dropped call still runs to completion and holds
    /// the gate until it does, so a retry never overlaps it.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Init` if the vault is unreachable, the database
    /// cannot be opened or decrypted, or schema creation fails.
    pub async fn init(&self) -> StoreResult<()> {
        let gate = Arc::clone(&self.init_gate).lock_owned().await;

        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            if matches!(*state, State::Ready(_)) {
                debug!("Entry store already initialized");
                return Ok(());
            }
            *state = State::Initializing;
        }
        let ticket = InitTicket {
            state: Arc::clone(&self.state),
            abandoned: Arc::new(AtomicBool::new(false)),
        };
        let guard = AbandonOnDrop(Some(ticket.clone()));

        info!("Initializing entry store");
        let secrets = Arc::clone(&self.vault);
        let key_name = self.key_name.clone();
        let db_path = self.db_path.clone();
        let task = tokio::task::spawn_blocking(move || {
            // Released only after the outcome has been applied to the state.
            let _gate = gate;
            let opened = open_database(secrets.as_ref(), &key_name, &db_path);
            ticket.finish(opened)
        });

        match task.await {
            Ok(outcome) => {
                guard.disarm();
                outcome.map_err(StoreError::Init)?;
                info!("Entry store ready");
                Ok(())
            }
            // Dropping the guard resets the state to Uninitialized.
            Err(e) => Err(StoreError::Init(InitError::Database(DatabaseError::Task(e)))),
        }
    }

    /// Looks up the entry for `(date, mode)`.
    ///
    /// Returns `Ok(None)` when no entry exists.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotInitialized` before `init`, `StoreError::InvalidDate`
    /// for a blank date and `StoreError::Query` if the read fails.
    pub async fn get_entry(&self, date: &str, mode: EntryMode) -> StoreResult<Option<DiaryEntry>> {
        let date = validate_date(date)?;
        self.run(move |conn| entries::get_entry(conn, &date, mode))
            .await?
            .map_err(StoreError::Query)
    }

    /// Saves `content` as the entry for `(date, mode)`.
    ///
    /// Inserts a new entry or replaces the content of the existing one in a
    /// single statement, refreshing `updated_at`. Content is stored verbatim.
    /// Returns the entry id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotInitialized` before `init`, `StoreError::InvalidDate`
    /// for a blank date and `StoreError::Write` if the write fails.
    pub async fn set_entry(&self, date: &str, mode: EntryMode, content: &str) -> StoreResult<i64> {
        let date = validate_date(date)?;
        let content = content.to_owned();
        self.run(move |conn| entries::upsert_entry(conn, &date, mode, &content))
            .await?
            .map_err(StoreError::Write)
    }

    /// Deletes the entry for `(date, mode)`.
    ///
    /// Returns `true` if an entry was removed; deleting a missing entry succeeds
    /// with `false`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotInitialized` before `init`, `StoreError::InvalidDate`
    /// for a blank date and `StoreError::Write` if the delete fails.
    pub async fn delete_entry(&self, date: &str, mode: EntryMode) -> StoreResult<bool> {
        let date = validate_date(date)?;
        self.run(move |conn| entries::delete_entry(conn, &date, mode))
            .await?
            .map_err(StoreError::Write)
    }

    /// Returns every entry ordered by date, newest first, then by creation time.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotInitialized` before `init` and
    /// `StoreError::Query` if the read fails.
    pub async fn get_all_entries(&self) -> StoreResult<Vec<DiaryEntry>> {
        self.run(entries::list_entries)
            .await?
            .map_err(StoreError::Query)
    }

    /// Returns entries with `start <= date <= end`, newest date first.
    ///
    /// The comparison is lexicographic, which matches calendar order for
    /// zero-padded `YYYY-MM-DD` dates.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotInitialized` before `init`, `StoreError::InvalidDate`
    /// for a blank bound and `StoreError::Query` if the read fails.
    pub async fn get_entries_by_date_range(
        &self,
        start: &str,
        end: &str,
    ) -> StoreResult<Vec<DiaryEntry>> {
        let start = validate_date(start)?;
        let end = validate_date(end)?;
        self.run(move |conn| entries::list_entries_in_range(conn, &start, &end))
            .await?
            .map_err(StoreError::Query)
    }

    /// Reads the `qa` entry for `date` as structured answers.
    ///
    /// # Errors
    ///
    /// As [`get_entry`](Self::get_entry), plus `StoreError::Content` when the
    /// stored content is not a valid answer map.
    pub async fn get_qa_answers(&self, date: &str) -> StoreResult<Option<QaAnswers>> {
        match self.get_entry(date, EntryMode::Qa).await? {
            Some(entry) => Ok(Some(QaAnswers::from_content(&entry.content)?)),
            None => Ok(None),
        }
    }

    /// Saves structured answers as the `qa` entry for `date`.
    ///
    /// # Errors
    ///
    /// As [`set_entry`](Self::set_entry).
    pub async fn set_qa_answers(&self, date: &str, answers: &QaAnswers) -> StoreResult<i64> {
        let content = answers.to_content()?;
        self.set_entry(date, EntryMode::Qa, &content).await
    }

    fn database(&self) -> StoreResult<Database> {
        match &*self.state.read().unwrap_or_else(PoisonError::into_inner) {
            State::Ready(db) => Ok(db.clone()),
            State::Uninitialized | State::Initializing => Err(StoreError::NotInitialized),
        }
    }

    /// Runs `op` against the connection on the blocking pool.
    ///
    /// The outer result reports sequencing errors; the inner one is the
    /// database outcome, classified by the caller as a query or write failure.
    async fn run<T, F>(&self, op: F) -> StoreResult<DatabaseResult<T>>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> DatabaseResult<T> + Send + 'static,
    {
        let db = self.database()?;
        let outcome = tokio::task::spawn_blocking(move || {
            let conn = db.get_conn()?;
            op(&*conn)
        })
        .await
        .map_err(DatabaseError::Task)
        .and_then(|result| result);
        Ok(outcome)
    }
}

/// Provisions the key, opens the encrypted file and creates the schema.
fn open_database(
    secrets: &dyn SecretVault,
    key_name: &str,
    db_path: &Path,
) -> Result<Database, InitError> {
    let key = vault::load_or_create_key(secrets, key_name)?;
    ensure_parent_dir(db_path)?;
    let db = Database::open(db_path, &key)?;
    restrict_file_permissions(db_path)?;
    db.initialize_schema()?;
    Ok(db)
}

/// One initialization attempt, shared by `init` and its blocking task.
#[derive(Clone)]
struct InitTicket {
    state: Arc<RwLock<State>>,
    abandoned: Arc<AtomicBool>,
}

impl InitTicket {
    /// Applies the outcome of the blocking work.
    ///
    /// An abandoned attempt leaves the store `Uninitialized` and closes the
    /// database it opened.
    fn finish(&self, opened: Result<Database, InitError>) -> Result<(), InitError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if self.abandoned.load(Ordering::SeqCst) {
            debug!("Initialization was abandoned by its caller");
            return opened.map(drop);
        }
        match opened {
            Ok(db) => {
                *state = State::Ready(db);
                Ok(())
            }
            Err(e) => {
                *state = State::Uninitialized;
                Err(e)
            }
        }
    }

    fn abandon(&self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        self.abandoned.store(true, Ordering::SeqCst);
        if matches!(*state, State::Initializing) {
            *state = State::Uninitialized;
        }
    }
}

/// Abandons the attempt when the `init` future goes away before its task reports back.
struct AbandonOnDrop(Option<InitTicket>);

impl AbandonOnDrop {
    fn disarm(mut self) {
        self.0 = None;
    }
}

impl Drop for AbandonOnDrop {
    fn drop(&mut self) {
        if let Some(ticket) = self.0.take() {
            ticket.abandon();
        }
    }
}

fn validate_date(date: &str) -> StoreResult<String> {
    if date.trim().is_empty() {
        return Err(StoreError::InvalidDate(date.to_string()));
    }
    Ok(date.to_string())
}

fn ensure_parent_dir(db_path: &Path) -> std::io::Result<()> {
    let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };
    if parent.exists() {
        return Ok(());
    }

    debug!("Creating data directory {:?}", parent);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        fs::DirBuilder::new()
            .recursive(true)
            .mode(crate::constants::DEFAULT_DIR_PERMISSIONS)
            .create(parent)
    }
    #[cfg(not(unix))]
    {
        fs::create_dir_all(parent)
    }
}

fn restrict_file_permissions(db_path: &Path) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(
            db_path,
            fs::Permissions::from_mode(crate::constants::DEFAULT_FILE_PERMISSIONS),
        )?;
    }
    #[cfg(not(unix))]
    let _ = db_path;
    Ok(())
}
