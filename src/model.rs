//! Diary entry types shared by the store, the database layer and the CLI.

use chrono::NaiveDateTime;
use std::fmt;
use std::str::FromStr;

/// The variant of a diary entry.
///
/// Each calendar date can hold at most one entry per mode.
///
/// # Examples
///
/// ```
/// use diary_store::EntryMode;
///
/// let mode: EntryMode = "qa".parse().unwrap();
/// assert_eq!(mode, EntryMode::Qa);
/// assert_eq!(mode.as_str(), "qa");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryMode {
    /// Open free-form text.
    Free,
    /// Answers to the guided question set.
    Qa,
}

impl EntryMode {
    /// All modes, in display order.
    pub const ALL: [EntryMode; 2] = [EntryMode::Free, EntryMode::Qa];

    /// The tag stored in the `mode` column.
    pub fn as_str(self) -> &'static str {
        match self {
            EntryMode::Free => "free",
            EntryMode::Qa => "qa",
        }
    }
}

impl fmt::Display for EntryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Returned when a string is not a known entry mode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown entry mode '{0}'. Expected 'free' or 'qa'")]
pub struct UnknownModeError(pub String);

impl FromStr for EntryMode {
    type Err = UnknownModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(EntryMode::Free),
            "qa" => Ok(EntryMode::Qa),
            other => Err(UnknownModeError(other.to_string())),
        }
    }
}

/// A persisted diary entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiaryEntry {
    pub id: i64,
    pub date: String,
    pub mode: EntryMode,
    /// Stored verbatim. For [`EntryMode::Qa`] this is an encoded
    /// [`QaAnswers`](crate::qa::QaAnswers) map.
    pub content: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_round_trips_through_tag() {
        for mode in EntryMode::ALL {
            assert_eq!(mode.as_str().parse::<EntryMode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_unknown_mode_rejected() {
        let err = "QA".parse::<EntryMode>().unwrap_err();
        assert_eq!(err, UnknownModeError("QA".to_string()));
        assert!(err.to_string().contains("Expected 'free' or 'qa'"));
    }
}
