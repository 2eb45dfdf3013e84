/*!
# diary-store

An encrypted local store for daily diary entries. Each calendar date can hold
one entry per mode: free-form text (`free`) or answers to a fixed set of
guided questions (`qa`).

## Core Features

- SQLCipher-encrypted single-file database
- Encryption key generated once and kept in the system keychain
- Upsert, lookup, delete and listing of entries keyed by `(date, mode)`
- Typed question/answer content on top of the opaque entry text

## Architecture

- `store`: The entry store and its initialization lifecycle
- `db`: Encrypted database handle, schema and entry SQL
- `vault`: Secret vault abstraction and encryption key provisioning
- `qa`: Guided questions and the answer map codec
- `config`: Configuration loading and validation
- `errors`: Error handling infrastructure
- `cli` / `ops`: The `diary` command-line host

## Usage Example

```rust,no_run
use diary_store::{Config, EntryMode, EntryStore};

#[tokio::main]
async fn main() -> diary_store::AppResult<()> {
    let config = Config::load()?;
    config.validate()?;

    let store = EntryStore::from_config(&config);
    store.init().await?;

    store.set_entry("2024-06-01", EntryMode::Free, "Started the diary.").await?;
    for entry in store.get_all_entries().await? {
        println!("{} {}", entry.date, entry.mode);
    }
    Ok(())
}
```
*/

/// Command-line interface for parsing and handling user arguments
pub mod cli;
/// Configuration loading and management
pub mod config;
/// Application-wide constants
pub mod constants;
/// Encrypted database access
pub mod db;
/// Error types and utilities for error handling
pub mod errors;
/// Diary entry types
pub mod model;
/// Command implementations used by the binary
pub mod ops;
/// Guided questions and answer content
pub mod qa;
/// The entry store
pub mod store;
/// Secret vault access
pub mod vault;

// Re-export important types for convenience
pub use cli::CliArgs;
pub use config::Config;
pub use errors::{AppError, AppResult, StoreError, StoreResult};
pub use model::{DiaryEntry, EntryMode};
pub use store::{EntryStore, StoreStatus};
