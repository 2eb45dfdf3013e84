//! Entry CRUD operations.
//!
//! This module provides the synchronous SQL behind each store operation:
//! upserting, reading, deleting and listing diary entries keyed by
//! `(date, mode)`.

use crate::constants::TIMESTAMP_FORMAT;
use crate::errors::DatabaseResult;
use crate::model::{DiaryEntry, EntryMode};
use chrono::NaiveDateTime;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

const SELECT_COLUMNS: &str = "SELECT id, date, mode, content, created_at, updated_at FROM diary_entries";

/// Inserts an entry or replaces the content of the existing one.
///
/// On insert both timestamps come from the column defaults. On conflict only
/// `content` and `updated_at` change, so `id` and `created_at` are preserved.
/// Returns the entry ID.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn upsert_entry(
    conn: &Connection,
    date: &str,
    mode: EntryMode,
    content: &str,
) -> DatabaseResult<i64> {
    debug!(
        "Upserting {} entry for date {} ({} bytes)",
        mode,
        date,
        content.len()
    );

    conn.execute(
        r#"
        INSERT INTO diary_entries (date, mode, content)
        VALUES (?1, ?2, ?3)
        ON CONFLICT(date, mode) DO UPDATE SET
            content = excluded.content,
            updated_at = strftime('%Y-%m-%d %H:%M:%f', 'now')
        "#,
        params![date, mode.as_str(), content],
    )?;

    let entry_id: i64 = conn.query_row(
        "SELECT id FROM diary_entries WHERE date = ?1 AND mode = ?2",
        params![date, mode.as_str()],
        |row| row.get(0),
    )?;

    debug!("Entry upserted with id {}", entry_id);
    Ok(entry_id)
}

/// Retrieves the entry for a date and mode.
///
/// # Errors
///
/// Returns an error if the database operation fails.
/// Returns `Ok(None)` if no entry exists for the pair.
pub fn get_entry(conn: &Connection, date: &str, mode: EntryMode) -> DatabaseResult<Option<DiaryEntry>> {
    debug!("Getting {} entry for date {}", mode, date);

    let entry = conn
        .query_row(
            &format!("{SELECT_COLUMNS} WHERE date = ?1 AND mode = ?2"),
            params![date, mode.as_str()],
            map_entry,
        )
        .optional()?;
    Ok(entry)
}

/// Deletes the entry for a date and mode.
///
/// Returns `true` if a row was removed. A missing entry is not an error.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn delete_entry(conn: &Connection, date: &str, mode: EntryMode) -> DatabaseResult<bool> {
    debug!("Deleting {} entry for date {}", mode, date);

    let rows_affected = conn.execute(
        "DELETE FROM diary_entries WHERE date = ?1 AND mode = ?2",
        params![date, mode.as_str()],
    )?;

    Ok(rows_affected > 0)
}

/// Lists every entry, newest date first.
///
/// Entries sharing a date are ordered by `created_at` descending.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn list_entries(conn: &Connection) -> DatabaseResult<Vec<DiaryEntry>> {
    debug!("Listing all entries");

    let mut stmt = conn.prepare(&format!(
        "{SELECT_COLUMNS} ORDER BY date DESC, created_at DESC, id DESC"
    ))?;
    let entries = stmt
        .query_map([], map_entry)?
        .collect::<Result<Vec<_>, _>>()?;

    debug!("Found {} entries", entries.len());
    Ok(entries)
}

/// Lists entries whose date lies within `[start, end]`, newest date first.
///
/// Dates are compared as strings, which matches calendar order for
/// zero-padded `YYYY-MM-DD` values.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn list_entries_in_range(
    conn: &Connection,
    start: &str,
    end: &str,
) -> DatabaseResult<Vec<DiaryEntry>> {
    debug!("Listing entries from {} to {}", start, end);

    let mut stmt = conn.prepare(&format!(
        "{SELECT_COLUMNS} WHERE date >= ?1 AND date <= ?2 ORDER BY date DESC, created_at DESC, id DESC"
    ))?;
    let entries = stmt
        .query_map(params![start, end], map_entry)?
        .collect::<Result<Vec<_>, _>>()?;

    debug!("Found {} entries in range", entries.len());
    Ok(entries)
}

fn map_entry(row: &Row<'_>) -> rusqlite::Result<DiaryEntry> {
    let mode_tag: String = row.get(2)?;
    let mode = mode_tag
        .parse::<EntryMode>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;

    Ok(DiaryEntry {
        id: row.get(0)?,
        date: row.get(1)?,
        mode,
        content: row.get(3)?,
        created_at: parse_timestamp(row, 4)?,
        updated_at: parse_timestamp(row, 5)?,
    })
}

fn parse_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let raw: String = row.get(idx)?;
    NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
