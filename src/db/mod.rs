//! Database operations for diary entries.
//!
//! This module provides encrypted SQLite database operations using SQLCipher.
//! The handle wraps an r2d2 pool capped at a single connection: the store
//! shares one connection for the lifetime of the process and every statement
//! runs on it in turn.
//!
//! # Module Structure
//!
//! - `schema`: Table definitions, schema initialization and migrations
//! - `entries`: Entry CRUD operations
//!
//! # Example
//!
//! ```no_run
//! use diary_store::db::Database;
//! use std::path::Path;
//!
//! let db_path = Path::new("/tmp/diary.db");
//! let db = Database::open(db_path, "secret-key")?;
//! db.initialize_schema()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod entries;
pub mod schema;

use crate::constants::REDACTED_PLACEHOLDER;
use crate::errors::{DatabaseError, DatabaseResult};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use std::fmt;
use std::path::Path;
use tracing::{debug, info};
use zeroize::Zeroizing;

/// Type alias for a pooled SQLite connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Database handle over a single encrypted connection.
///
/// Cloning the handle is cheap and shares the same connection.
#[derive(Clone)]
pub struct Database {
    pool: Pool<SqliteConnectionManager>,
}

impl Database {
    /// Opens or creates an encrypted SQLite database.
    ///
    /// The database is encrypted using SQLCipher with the provided key.
    /// If the database file doesn't exist, it will be created.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Database file cannot be opened
    /// - The key does not match an existing database
    /// - Connection pool cannot be initialized
    pub fn open(db_path: &Path, key: &str) -> DatabaseResult<Self> {
        debug!("Opening database at: {:?}", db_path);

        let manager = SqliteConnectionManager::file(db_path);
        let pool = Pool::builder()
            .max_size(1)
            .connection_customizer(Box::new(SqlCipherConfig {
                key: Zeroizing::new(key.to_string()),
            }))
            .build(manager)?;

        // SQLCipher only detects a wrong key on the first page read
        let conn = pool.get()?;
        conn.query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| {
            row.get::<_, i64>(0)
        })?;
        drop(conn);

        info!("Database opened successfully");
        Ok(Database { pool })
    }

    /// Gets the connection from the pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection is not returned in time.
    pub fn get_conn(&self) -> DatabaseResult<PooledConnection> {
        self.pool.get().map_err(DatabaseError::Pool)
    }

    /// Initializes the database schema.
    ///
    /// Creates the entries table and indexes if they don't exist and applies
    /// pending migrations. Safe to call multiple times.
    ///
    /// # Errors
    ///
    /// Returns an error if schema creation fails.
    pub fn initialize_schema(&self) -> DatabaseResult<()> {
        let conn = self.get_conn()?;
        schema::create_tables(&conn)?;
        info!("Database schema initialized");
        Ok(())
    }
}

/// Connection customizer that sets the SQLCipher key pragma.
struct SqlCipherConfig {
    key: Zeroizing<String>,
}

impl fmt::Debug for SqlCipherConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlCipherConfig")
            .field("key", &REDACTED_PLACEHOLDER)
            .finish()
    }
}

impl r2d2::CustomizeConnection<Connection, rusqlite::Error> for SqlCipherConfig {
    fn on_acquire(&self, conn: &mut Connection) -> Result<(), rusqlite::Error> {
        conn.pragma_update(None, "key", self.key.as_str())?;
        // Use modern SQLCipher defaults (version 4)
        conn.pragma_update(None, "cipher_page_size", 4096)?;
        conn.pragma_update(None, "kdf_iter", 256000)?;
        conn.pragma_update(None, "cipher_hmac_algorithm", "HMAC_SHA512")?;
        conn.pragma_update(None, "cipher_kdf_algorithm", "PBKDF2_HMAC_SHA512")?;
        Ok(())
    }

    fn on_release(&self, _conn: Connection) {}
}
