//! Database schema definitions and initialization.
//!
//! The store keeps a single `diary_entries` table. Schema creation is
//! conditional, so running it against an existing database never drops or
//! rewrites data. A `schema_version` table records which layout has been
//! applied:
//!
//! - version 1: the entries table and the `date` index
//! - version 2: a unique `(date, mode)` index backing the single-statement upsert

use crate::constants::ENTRIES_TABLE;
use crate::errors::DatabaseResult;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

/// Current schema version.
///
/// Increment this whenever schema changes are made and add a migration step.
pub const SCHEMA_VERSION: i32 = 2;

/// Creates the entries table and indexes, then applies pending migrations.
///
/// The entries table is only created when `sqlite_master` shows it missing.
/// Indexes use `IF NOT EXISTS`. Safe to call on every start.
///
/// # Errors
///
/// Returns an error if any DDL statement or migration fails.
pub fn create_tables(conn: &Connection) -> DatabaseResult<()> {
    debug!("Creating database tables");

    if table_exists(conn, ENTRIES_TABLE)? {
        debug!("Table {} already exists", ENTRIES_TABLE);
    } else {
        conn.execute_batch(
            r#"
            CREATE TABLE diary_entries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                mode TEXT NOT NULL,
                content TEXT NOT NULL,
                created_at DATETIME DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
                updated_at DATETIME DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
            );
            "#,
        )?;
        info!("Created table {}", ENTRIES_TABLE);
    }

    conn.execute_batch(
        r#"
        CREATE INDEX IF NOT EXISTS idx_diary_date ON diary_entries(date);

        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER NOT NULL,
            applied_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
        "#,
    )?;

    // Databases created before version tracking carry the version 1 layout.
    let current_version = get_schema_version(conn)?.unwrap_or(1);
    if current_version < 2 {
        migrate_unique_date_mode(conn)?;
    } else {
        debug!("Schema version already recorded: {}", current_version);
    }

    debug!("Database tables created successfully");
    Ok(())
}

/// Checks `sqlite_master` for a table with the given name.
///
/// # Errors
///
/// Returns an error if the catalog query fails (for example when the
/// encryption key is wrong).
pub fn table_exists(conn: &Connection, name: &str) -> DatabaseResult<bool> {
    let found: Option<String> = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Gets the current schema version from the database.
///
/// Returns `None` if the schema_version table doesn't exist or is empty.
///
/// # Errors
///
/// Returns an error if the query fails for reasons other than missing table.
pub fn get_schema_version(conn: &Connection) -> DatabaseResult<Option<i32>> {
    if !table_exists(conn, "schema_version")? {
        return Ok(None);
    }

    let version = conn
        .query_row("SELECT MAX(version) FROM schema_version", [], |row| {
            row.get::<_, Option<i32>>(0)
        })?;
    Ok(version)
}

/// Enforces one row per `(date, mode)` with a unique index.
///
/// Rows duplicated by the old read-then-write upsert are collapsed first,
/// keeping the most recently updated row (highest id on ties).
fn migrate_unique_date_mode(conn: &Connection) -> DatabaseResult<()> {
    let tx = conn.unchecked_transaction()?;

    let removed = tx.execute(
        r#"
        DELETE FROM diary_entries
        WHERE EXISTS (
            SELECT 1 FROM diary_entries AS newer
            WHERE newer.date = diary_entries.date
              AND newer.mode = diary_entries.mode
              AND (newer.updated_at > diary_entries.updated_at
                   OR (newer.updated_at = diary_entries.updated_at
                       AND newer.id > diary_entries.id))
        )
        "#,
        [],
    )?;
    if removed > 0 {
        info!("Removed {} duplicate entries before adding unique key", removed);
    }

    tx.execute_batch(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_diary_date_mode ON diary_entries(date, mode);",
    )?;
    tx.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        params![SCHEMA_VERSION],
    )?;
    tx.commit()?;

    info!("Initialized database schema version {}", SCHEMA_VERSION);
    Ok(())
}
