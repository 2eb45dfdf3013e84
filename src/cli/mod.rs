//! Command-line interface definitions for the `diary` binary.

use crate::constants::{
    APP_DESCRIPTION, APP_NAME, DATE_FORMAT_COMPACT, DATE_FORMAT_ISO, DEFAULT_LOG_LEVEL,
    LOG_FORMAT_JSON, LOG_FORMAT_TEXT,
};
use crate::model::EntryMode;
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::str::FromStr;

/// An encrypted daily diary with free-text and guided question modes
#[derive(Parser, Debug)]
#[command(name = APP_NAME, about = APP_DESCRIPTION, author, version, long_about = None)]
pub struct CliArgs {
    /// Log output format
    #[arg(long, value_parser = [LOG_FORMAT_TEXT, LOG_FORMAT_JSON], default_value = LOG_FORMAT_TEXT, global = true)]
    pub log_format: String,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = DEFAULT_LOG_LEVEL, global = true)]
    pub log_level: String,

    /// Print verbose (debug) logs
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Entry mode as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Free,
    Qa,
}

impl From<ModeArg> for EntryMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Free => EntryMode::Free,
            ModeArg::Qa => EntryMode::Qa,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the entry for a date
    Show {
        /// Date of the entry (YYYY-MM-DD or YYYYMMDD, defaults to today)
        #[arg(short = 'd', long, value_parser = parse_date)]
        date: Option<String>,

        /// Entry mode to show; both modes when omitted
        #[arg(short = 'm', long, value_enum)]
        mode: Option<ModeArg>,
    },

    /// Write a free-text entry (reads stdin when --text is omitted)
    Write {
        #[arg(short = 'd', long, value_parser = parse_date)]
        date: Option<String>,

        /// Entry text
        #[arg(short = 't', long)]
        text: Option<String>,
    },

    /// Answer guided questions, e.g. `-a 1="Rested" -a 4="Friends"`
    Answer {
        #[arg(short = 'd', long, value_parser = parse_date)]
        date: Option<String>,

        /// Answer in the form ID=TEXT
        #[arg(short = 'a', long = "answer", value_parser = parse_answer, required = true)]
        answers: Vec<(u32, String)>,
    },

    /// Delete the entry for a date and mode
    Delete {
        #[arg(short = 'd', long, value_parser = parse_date)]
        date: Option<String>,

        #[arg(short = 'm', long, value_enum)]
        mode: ModeArg,
    },

    /// List entries, optionally limited to an inclusive date range
    List {
        /// First date of the range
        #[arg(long, value_parser = parse_date, requires = "to")]
        from: Option<String>,

        /// Last date of the range
        #[arg(long, value_parser = parse_date, requires = "from")]
        to: Option<String>,
    },

    /// Print the guided question set
    Questions,
}

/// Parses a date in `YYYY-MM-DD` or `YYYYMMDD` form into `YYYY-MM-DD`.
pub fn parse_date(input: &str) -> Result<String, String> {
    NaiveDate::from_str(input)
        .or_else(|_| NaiveDate::parse_from_str(input, DATE_FORMAT_COMPACT))
        .map(|date| date.format(DATE_FORMAT_ISO).to_string())
        .map_err(|_| format!("invalid date '{}', expected YYYY-MM-DD or YYYYMMDD", input))
}

/// Parses an `ID=TEXT` answer.
pub fn parse_answer(input: &str) -> Result<(u32, String), String> {
    let (id, text) = input
        .split_once('=')
        .ok_or_else(|| format!("invalid answer '{}', expected ID=TEXT", input))?;
    let id: u32 = id
        .trim()
        .parse()
        .map_err(|_| format!("invalid question id '{}'", id.trim()))?;
    if id == 0 {
        return Err("question ids start at 1".to_string());
    }
    Ok((id, text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_defaults() {
        let args = CliArgs::parse_from(["diary", "show"]);
        assert_eq!(args.log_format, "text");
        assert_eq!(args.log_level, "info");
        assert!(!args.verbose);
        match args.command {
            Command::Show { date, mode } => {
                assert!(date.is_none());
                assert!(mode.is_none());
            }
            other => panic!("Expected show command, got {:?}", other),
        }
    }

    #[test]
    fn test_compact_date_normalized() {
        let args = CliArgs::parse_from(["diary", "show", "-d", "20240115", "-m", "qa"]);
        match args.command {
            Command::Show { date, mode } => {
                assert_eq!(date.as_deref(), Some("2024-01-15"));
                assert_eq!(mode, Some(ModeArg::Qa));
            }
            other => panic!("Expected show command, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_date_rejected() {
        assert!(CliArgs::try_parse_from(["diary", "show", "--date", "2024-13-01"]).is_err());
        assert!(parse_date("yesterday").is_err());
    }

    #[test]
    fn test_answer_parsing() {
        let args = CliArgs::parse_from(["diary", "answer", "-a", "1=Calm", "--answer", "4=Tea = joy"]);
        match args.command {
            Command::Answer { date, answers } => {
                assert!(date.is_none());
                assert_eq!(
                    answers,
                    vec![(1, "Calm".to_string()), (4, "Tea = joy".to_string())]
                );
            }
            other => panic!("Expected answer command, got {:?}", other),
        }

        assert!(parse_answer("no-separator").is_err());
        assert!(parse_answer("x=text").is_err());
        assert!(parse_answer("0=text").is_err());
    }

    #[test]
    fn test_list_range_requires_both_bounds() {
        assert!(CliArgs::try_parse_from(["diary", "list", "--from", "2024-01-01"]).is_err());

        let args = CliArgs::parse_from(["diary", "list", "--from", "2024-01-01", "--to", "2024-01-31"]);
        match args.command {
            Command::List { from, to } => {
                assert_eq!(from.as_deref(), Some("2024-01-01"));
                assert_eq!(to.as_deref(), Some("2024-01-31"));
            }
            other => panic!("Expected list command, got {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = CliArgs::parse_from(["diary", "list", "-v", "--log-format", "json"]);
        assert!(args.verbose);
        assert_eq!(args.log_format, "json");
        assert!(CliArgs::try_parse_from(["diary", "list", "--log-format", "xml"]).is_err());
    }

    #[test]
    fn test_delete_requires_mode() {
        assert!(CliArgs::try_parse_from(["diary", "delete"]).is_err());
        let args = CliArgs::parse_from(["diary", "delete", "-m", "free"]);
        assert!(matches!(
            args.command,
            Command::Delete { mode: ModeArg::Free, .. }
        ));
    }
}
