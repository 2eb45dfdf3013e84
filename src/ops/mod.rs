//! Command implementations for the `diary` binary.
//!
//! Each operation drives the [`EntryStore`] and writes human-readable output,
//! so it can be exercised in tests with an in-memory buffer.

use crate::errors::{AppError, AppResult};
use crate::model::{DiaryEntry, EntryMode};
use crate::qa::{self, QaAnswers, QUESTIONS};
use crate::store::EntryStore;
use std::io::Write;
use tracing::{debug, info};

/// Prints the entry for `date`, for one mode or both.
pub async fn show_entry(
    store: &EntryStore,
    date: &str,
    mode: Option<EntryMode>,
    out: &mut impl Write,
) -> AppResult<()> {
    let modes: &[EntryMode] = match mode {
        Some(ref mode) => std::slice::from_ref(mode),
        None => &EntryMode::ALL,
    };

    let mut found = false;
    for &mode in modes {
        if let Some(entry) = store.get_entry(date, mode).await? {
            render_entry(&entry, out)?;
            found = true;
        }
    }

    if !found {
        writeln!(out, "No entry for {}", date)?;
    }
    Ok(())
}

/// Saves free-form text for `date`.
///
/// Text is trimmed; blank text is refused.
pub async fn write_entry(
    store: &EntryStore,
    date: &str,
    text: &str,
    out: &mut impl Write,
) -> AppResult<()> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::Input(
            "Please write something before saving".to_string(),
        ));
    }

    let id = store.set_entry(date, EntryMode::Free, text).await?;
    info!("Saved free entry {} for {}", id, date);
    writeln!(out, "Saved entry for {}", date)?;
    Ok(())
}

/// Merges `answers` into the `qa` entry for `date` and saves it.
///
/// At least one answer in the merged set must be non-blank.
pub async fn answer_questions(
    store: &EntryStore,
    date: &str,
    answers: Vec<(u32, String)>,
    out: &mut impl Write,
) -> AppResult<()> {
    let mut update = QaAnswers::new();
    for (id, text) in answers {
        if qa::question(id).is_none() {
            return Err(AppError::Input(format!("Unknown question id {}", id)));
        }
        update.set(id, text)?;
    }

    let mut merged = store.get_qa_answers(date).await?.unwrap_or_default();
    merged.merge(update);
    if !merged.has_answers() {
        return Err(AppError::Input(
            "Please answer at least one question before saving".to_string(),
        ));
    }

    store.set_qa_answers(date, &merged).await?;
    debug!("Saved {} answers for {}", merged.answered_count(), date);
    writeln!(
        out,
        "Saved answers for {} ({}/{} answered)",
        date,
        merged.answered_count(),
        QUESTIONS.len()
    )?;
    Ok(())
}

/// Deletes the entry for `(date, mode)`; a missing entry is reported, not an error.
pub async fn delete_entry(
    store: &EntryStore,
    date: &str,
    mode: EntryMode,
    out: &mut impl Write,
) -> AppResult<()> {
    if store.delete_entry(date, mode).await? {
        writeln!(out, "Deleted {} entry for {}", mode, date)?;
    } else {
        writeln!(out, "No {} entry for {}", mode, date)?;
    }
    Ok(())
}

/// Lists entries, all of them or those within `[from, to]`.
pub async fn list_entries(
    store: &EntryStore,
    range: Option<(&str, &str)>,
    out: &mut impl Write,
) -> AppResult<()> {
    let entries = match range {
        Some((from, to)) => store.get_entries_by_date_range(from, to).await?,
        None => store.get_all_entries().await?,
    };

    if entries.is_empty() {
        writeln!(out, "No entries")?;
        return Ok(());
    }

    for entry in &entries {
        writeln!(out, "{}  {:<4}  {}", entry.date, entry.mode, summary(entry))?;
    }
    Ok(())
}

/// Prints the guided question set.
pub fn list_questions(out: &mut impl Write) -> AppResult<()> {
    for question in QUESTIONS.iter() {
        writeln!(out, "{}. {}", question.id, question.prompt)?;
    }
    Ok(())
}

fn render_entry(entry: &DiaryEntry, out: &mut impl Write) -> AppResult<()> {
    writeln!(
        out,
        "# {} ({}, updated {})",
        entry.date,
        entry.mode,
        entry.updated_at.format("%Y-%m-%d %H:%M")
    )?;
    match entry.mode {
        EntryMode::Free => writeln!(out, "{}", entry.content)?,
        EntryMode::Qa => {
            let answers = QaAnswers::from_content(&entry.content)?;
            for question in QUESTIONS.iter() {
                let answer = answers.get(question.id).unwrap_or("").trim();
                let answer = if answer.is_empty() { "-" } else { answer };
                writeln!(out, "{}. {}\n   {}", question.id, question.prompt, answer)?;
            }
        }
    }
    writeln!(out)?;
    Ok(())
}

fn summary(entry: &DiaryEntry) -> String {
    match entry.mode {
        EntryMode::Free => {
            let first_line = entry.content.lines().next().unwrap_or("");
            let mut preview: String = first_line.chars().take(60).collect();
            if first_line.chars().count() > 60 {
                preview.push_str("...");
            }
            preview
        }
        EntryMode::Qa => match QaAnswers::from_content(&entry.content) {
            Ok(answers) => format!("{}/{} answered", answers.answered_count(), QUESTIONS.len()),
            Err(_) => "(unreadable answers)".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::MemoryVault;
    use std::sync::Arc;
    use tempfile::TempDir;

    async fn ready_store() -> (TempDir, EntryStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = EntryStore::new(
            temp_dir.path().join("diary.db"),
            Arc::new(MemoryVault::new()),
        );
        store.init().await.unwrap();
        (temp_dir, store)
    }

    fn output(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    #[tokio::test]
    async fn test_write_then_show() {
        let (_dir, store) = ready_store().await;
        let mut buf = Vec::new();

        write_entry(&store, "2024-01-01", "  Quiet day.\n", &mut buf).await.unwrap();
        assert_eq!(output(std::mem::take(&mut buf)), "Saved entry for 2024-01-01\n");

        show_entry(&store, "2024-01-01", Some(EntryMode::Free), &mut buf)
            .await
            .unwrap();
        let shown = output(buf);
        assert!(shown.starts_with("# 2024-01-01 (free, updated "));
        assert!(shown.contains("\nQuiet day.\n"));
    }

    #[tokio::test]
    async fn test_blank_text_refused() {
        let (_dir, store) = ready_store().await;
        let result = write_entry(&store, "2024-01-01", " \n ", &mut Vec::new()).await;
        assert!(matches!(result, Err(AppError::Input(_))));
        assert!(store.get_all_entries().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_answers_merge_across_calls() {
        let (_dir, store) = ready_store().await;
        let mut buf = Vec::new();

        answer_questions(&store, "2024-01-02", vec![(1, "Calm".to_string())], &mut buf)
            .await
            .unwrap();
        answer_questions(&store, "2024-01-02", vec![(4, "Friends".to_string())], &mut buf)
            .await
            .unwrap();
        assert!(output(buf).ends_with("Saved answers for 2024-01-02 (2/5 answered)\n"));

        let answers = store.get_qa_answers("2024-01-02").await.unwrap().unwrap();
        assert_eq!(answers.get(1), Some("Calm"));
        assert_eq!(answers.get(4), Some("Friends"));
    }

    #[tokio::test]
    async fn test_answers_validation() {
        let (_dir, store) = ready_store().await;

        let unknown = answer_questions(&store, "2024-01-02", vec![(9, "x".to_string())], &mut Vec::new()).await;
        assert!(matches!(unknown, Err(AppError::Input(_))));

        let blank = answer_questions(&store, "2024-01-02", vec![(2, "  ".to_string())], &mut Vec::new()).await;
        assert!(matches!(blank, Err(AppError::Input(_))));
        assert!(store.get_qa_answers("2024-01-02").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_show_missing_entry() {
        let (_dir, store) = ready_store().await;
        let mut buf = Vec::new();
        show_entry(&store, "2024-05-05", None, &mut buf).await.unwrap();
        assert_eq!(output(buf), "No entry for 2024-05-05\n");
    }

    #[tokio::test]
    async fn test_show_renders_qa_against_catalog() {
        let (_dir, store) = ready_store().await;
        answer_questions(&store, "2024-01-03", vec![(2, "Sunset".to_string())], &mut Vec::new())
            .await
            .unwrap();

        let mut buf = Vec::new();
        show_entry(&store, "2024-01-03", None, &mut buf).await.unwrap();
        let shown = output(buf);
        assert!(shown.contains("2. What was the highlight of your day?\n   Sunset\n"));
        assert!(shown.contains("1. How are you feeling today and what contributed to this mood?\n   -\n"));
    }

    #[tokio::test]
    async fn test_delete_reports_missing() {
        let (_dir, store) = ready_store().await;
        let mut buf = Vec::new();

        write_entry(&store, "2024-01-01", "x", &mut Vec::new()).await.unwrap();
        delete_entry(&store, "2024-01-01", EntryMode::Free, &mut buf).await.unwrap();
        delete_entry(&store, "2024-01-01", EntryMode::Free, &mut buf).await.unwrap();

        assert_eq!(
            output(buf),
            "Deleted free entry for 2024-01-01\nNo free entry for 2024-01-01\n"
        );
    }

    #[tokio::test]
    async fn test_list_all_and_range() {
        let (_dir, store) = ready_store().await;
        for date in ["2024-01-01", "2024-01-02", "2024-01-03"] {
            write_entry(&store, date, &format!("Entry on {}", date), &mut Vec::new())
                .await
                .unwrap();
        }

        let mut buf = Vec::new();
        list_entries(&store, None, &mut buf).await.unwrap();
        let listed = output(buf);
        let dates: Vec<&str> = listed.lines().map(|l| &l[..10]).collect();
        assert_eq!(dates, vec!["2024-01-03", "2024-01-02", "2024-01-01"]);

        let mut buf = Vec::new();
        list_entries(&store, Some(("2024-01-01", "2024-01-02")), &mut buf)
            .await
            .unwrap();
        assert_eq!(output(buf).lines().count(), 2);

        let mut buf = Vec::new();
        list_entries(&store, Some(("2025-01-01", "2025-12-31")), &mut buf)
            .await
            .unwrap();
        assert_eq!(output(buf), "No entries\n");
    }

    #[test]
    fn test_summary_truncates_long_text() {
        let timestamp = chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let entry = DiaryEntry {
            id: 1,
            date: "2024-01-01".to_string(),
            mode: EntryMode::Free,
            content: "x".repeat(80),
            created_at: timestamp,
            updated_at: timestamp,
        };
        let preview = summary(&entry);
        assert_eq!(preview.len(), 63);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn test_list_questions() {
        let mut buf = Vec::new();
        list_questions(&mut buf).unwrap();
        let listed = output(buf);
        assert_eq!(listed.lines().count(), 5);
        assert!(listed.starts_with("1. How are you feeling today"));
    }
}
