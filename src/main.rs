/*!
# diary - An Encrypted Daily Diary

`diary` is the command-line host for the entry store. It loads configuration,
initializes the encrypted store once, and runs a single command against it.

## Usage

```text
diary [OPTIONS] <COMMAND>

Commands:
  show       Show the entry for a date
  write      Write a free-text entry (reads stdin when --text is omitted)
  answer     Answer guided questions, e.g. `-a 1="Rested" -a 4="Friends"`
  delete     Delete the entry for a date and mode
  list       List entries, optionally limited to an inclusive date range
  questions  Print the guided question set

Options:
      --log-format <LOG_FORMAT>  Log output format [default: text] [possible values: text, json]
      --log-level <LOG_LEVEL>    Log level used when RUST_LOG is not set [default: info]
  -v, --verbose                  Print verbose (debug) logs
```

## Configuration

- `DIARY_DATA_DIR`: directory holding `diary.db` (defaults to `~/.local/share/diary`)
- `DIARY_VAULT_SERVICE`: keychain service name (defaults to `diary-store`)
- `RUST_LOG`: tracing filter, overrides `--log-level`
*/

use chrono::Local;
use clap::Parser;
use diary_store::cli::{CliArgs, Command};
use diary_store::config::Config;
use diary_store::constants::{
    DATE_FORMAT_ISO, LOG_FORMAT_JSON, TRACING_ROOT_SPAN_NAME, TRACING_SERVICE_NAME,
};
use diary_store::errors::{AppError, AppResult, StoreError};
use diary_store::ops;
use diary_store::store::EntryStore;
use std::io::{self, IsTerminal, Read};
use tracing::{debug, error, info, info_span, Instrument};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_tracing(&args);

    let span = info_span!(
        TRACING_ROOT_SPAN_NAME,
        service = TRACING_SERVICE_NAME,
        correlation_id = %Uuid::new_v4()
    );

    if let Err(e) = run(args).instrument(span).await {
        error!("{}", e);
        eprintln!("Error: {}", e);
        if let Some(hint) = user_hint(&e) {
            eprintln!("{}", hint);
        }
        std::process::exit(1);
    }
}

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `--verbose`, which takes precedence over
/// `--log-level`. Logs go to stderr so command output stays clean.
fn init_tracing(args: &CliArgs) {
    let default_directive = if args.verbose {
        "debug"
    } else {
        args.log_level.as_str()
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    let registry = tracing_subscriber::registry().with(filter);

    if args.log_format == LOG_FORMAT_JSON {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_timer(fmt::time::ChronoLocal::rfc_3339())
                    .with_writer(io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_ansi(io::stderr().is_terminal())
                    .with_timer(fmt::time::ChronoLocal::rfc_3339())
                    .with_writer(io::stderr),
            )
            .init();
    }
}

async fn run(args: CliArgs) -> AppResult<()> {
    info!("Starting diary");
    debug!("CLI arguments: {:?}", args);

    let mut stdout = io::stdout().lock();
    if let Command::Questions = args.command {
        return ops::list_questions(&mut stdout);
    }

    let config = Config::load()?;
    config.validate()?;
    debug!("Loaded configuration: {:?}", config);

    let store = EntryStore::from_config(&config);
    store.init().await?;

    let today = Local::now().date_naive().format(DATE_FORMAT_ISO).to_string();
    match args.command {
        Command::Show { date, mode } => {
            let date = date.unwrap_or(today);
            ops::show_entry(&store, &date, mode.map(Into::into), &mut stdout).await
        }
        Command::Write { date, text } => {
            let date = date.unwrap_or(today);
            let text = match text {
                Some(text) => text,
                None => {
                    let mut buffer = String::new();
                    io::stdin().read_to_string(&mut buffer)?;
                    buffer
                }
            };
            ops::write_entry(&store, &date, &text, &mut stdout).await
        }
        Command::Answer { date, answers } => {
            let date = date.unwrap_or(today);
            ops::answer_questions(&store, &date, answers, &mut stdout).await
        }
        Command::Delete { date, mode } => {
            let date = date.unwrap_or(today);
            ops::delete_entry(&store, &date, mode.into(), &mut stdout).await
        }
        Command::List { from, to } => {
            let range = from.as_deref().zip(to.as_deref());
            ops::list_entries(&store, range, &mut stdout).await
        }
        Command::Questions => ops::list_questions(&mut stdout),
    }
}

/// A short retry prompt for recoverable store failures.
fn user_hint(err: &AppError) -> Option<&'static str> {
    match err {
        AppError::Store(StoreError::Write(_)) => Some("Failed to save, please try again."),
        AppError::Store(StoreError::Query(_)) => Some("Could not load entries, please try again."),
        _ => None,
    }
}
