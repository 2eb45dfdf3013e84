//! Shared names, defaults and formats for the diary store and the `diary` binary.

// Application Metadata
/// The name of the application.
pub const APP_NAME: &str = "diary";
/// The description of the application used in CLI help text.
pub const APP_DESCRIPTION: &str = "An encrypted daily diary with free-text and guided question modes";

// CLI Arguments & Defaults
/// Log format identifier for plain text.
pub const LOG_FORMAT_TEXT: &str = "text";
/// Log format identifier for JSON.
pub const LOG_FORMAT_JSON: &str = "json";
/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// Configuration Keys & Environment Variables
/// Environment variable for the directory holding the diary database.
pub const ENV_VAR_DIARY_DATA_DIR: &str = "DIARY_DATA_DIR";
/// Environment variable overriding the keychain service name.
pub const ENV_VAR_DIARY_VAULT_SERVICE: &str = "DIARY_VAULT_SERVICE";
/// Environment variable supplying a fixed encryption key for non-interactive testing.
pub const ENV_VAR_DIARY_TEST_KEY: &str = "DIARY_TEST_ENCRYPTION_KEY";
/// Standard environment variable for the user's home directory.
pub const ENV_VAR_HOME: &str = "HOME";
/// Default sub-directory for the database within the user's home directory.
pub const DEFAULT_DATA_SUBDIR: &str = ".local/share/diary";
/// Default keychain service name.
pub const DEFAULT_VAULT_SERVICE: &str = "diary-store";

// Storage
/// File name of the encrypted database inside the data directory.
pub const DB_FILE_NAME: &str = "diary.db";
/// Vault entry name under which the database encryption key is stored.
pub const DB_ENCRYPTION_KEY_NAME: &str = "db_encryption_key";
/// Name of the entries table.
pub const ENTRIES_TABLE: &str = "diary_entries";
/// Placeholder string for redacted information in debug output.
pub const REDACTED_PLACEHOLDER: &str = "[REDACTED]";

// File System Parameters
/// Default POSIX permissions for newly created directories (owner read/write/execute).
#[cfg(unix)]
pub const DEFAULT_DIR_PERMISSIONS: u32 = 0o700;
/// Default POSIX permissions for the database file (owner read/write).
#[cfg(unix)]
pub const DEFAULT_FILE_PERMISSIONS: u32 = 0o600;

// Date/Time Logic
/// Date format string for ISO date format (YYYY-MM-DD).
pub const DATE_FORMAT_ISO: &str = "%Y-%m-%d";
/// Date format string for compact date format (YYYYMMDD).
pub const DATE_FORMAT_COMPACT: &str = "%Y%m%d";
/// Format of timestamps written by the database clock.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

// Logging Configuration
/// Service name used in tracing spans and structured logs.
pub const TRACING_SERVICE_NAME: &str = "diary";
/// Name for the root tracing span covering an application invocation.
pub const TRACING_ROOT_SPAN_NAME: &str = "app_invocation";
