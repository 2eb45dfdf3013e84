use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

use test_helpers::{base_diary_command, configure_diary_command};

#[test]
fn test_cli_no_args_shows_usage() {
    let mut cmd = Command::cargo_bin("diary").unwrap();
    cmd.env_clear();

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_questions_needs_no_store() {
    let mut cmd = Command::cargo_bin("diary").unwrap();
    cmd.env_clear().arg("questions");

    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("1. How are you feeling today"))
        .stdout(predicate::str::contains("5. What would you like to improve or do differently tomorrow?"));
}

#[test]
fn test_cli_write_then_show() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempdir()?;

    base_diary_command(temp_dir.path())
        .args(["write", "--date", "2024-01-15", "--text", "Walked by the river."])
        .assert()
        .success()
        .stdout("Saved entry for 2024-01-15\n");

    base_diary_command(temp_dir.path())
        .args(["show", "--date", "20240115"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# 2024-01-15 (free, updated "))
        .stdout(predicate::str::contains("Walked by the river."));

    assert!(temp_dir.path().join("diary.db").exists());
    Ok(())
}

#[test]
fn test_cli_write_reads_stdin() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempdir()?;

    base_diary_command(temp_dir.path())
        .args(["write", "-d", "2024-02-01"])
        .write_stdin("Typed into the pipe\n")
        .assert()
        .success();

    base_diary_command(temp_dir.path())
        .args(["show", "-d", "2024-02-01", "-m", "free"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Typed into the pipe"));
    Ok(())
}

#[test]
fn test_cli_write_rejects_blank_text() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempdir()?;

    base_diary_command(temp_dir.path())
        .args(["write", "-d", "2024-02-01", "-t", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please write something before saving"));
    Ok(())
}

#[test]
fn test_cli_answer_and_list() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempdir()?;

    base_diary_command(temp_dir.path())
        .args(["answer", "-d", "2024-03-01", "-a", "1=Rested", "-a", "4=Friends"])
        .assert()
        .success()
        .stdout("Saved answers for 2024-03-01 (2/5 answered)\n");

    base_diary_command(temp_dir.path())
        .args(["write", "-d", "2024-03-02", "-t", "Second day"])
        .assert()
        .success();

    base_diary_command(temp_dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("2024-03-02  free  Second day\n"))
        .stdout(predicate::str::contains("2024-03-01  qa    2/5 answered"));

    base_diary_command(temp_dir.path())
        .args(["list", "--from", "2024-03-01", "--to", "2024-03-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-03-02").not());
    Ok(())
}

#[test]
fn test_cli_delete() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempdir()?;

    base_diary_command(temp_dir.path())
        .args(["write", "-d", "2024-04-01", "-t", "Temporary"])
        .assert()
        .success();

    base_diary_command(temp_dir.path())
        .args(["delete", "-d", "2024-04-01", "-m", "free"])
        .assert()
        .success()
        .stdout("Deleted free entry for 2024-04-01\n");

    base_diary_command(temp_dir.path())
        .args(["delete", "-d", "2024-04-01", "-m", "free"])
        .assert()
        .success()
        .stdout("No free entry for 2024-04-01\n");
    Ok(())
}

#[test]
fn test_cli_invalid_date() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempdir()?;

    base_diary_command(temp_dir.path())
        .args(["show", "--date", "not-a-date"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid date 'not-a-date'"));
    Ok(())
}

#[test]
fn test_cli_wrong_key_fails_init() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempdir()?;

    base_diary_command(temp_dir.path())
        .args(["write", "-d", "2024-05-01", "-t", "Secret"])
        .assert()
        .success();

    let mut cmd = Command::cargo_bin("diary")?;
    configure_diary_command(&mut cmd, temp_dir.path(), "a-different-key");
    cmd.args(["show", "-d", "2024-05-01"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Failed to initialize entry store"));
    Ok(())
}

#[test]
fn test_cli_json_logs_carry_correlation_id() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempdir()?;

    base_diary_command(temp_dir.path())
        .args(["--log-format", "json", "list"])
        .assert()
        .success()
        .stdout("No entries\n")
        .stderr(predicate::str::contains("\"correlation_id\""))
        .stderr(predicate::str::contains("Starting diary"));
    Ok(())
}

#[test]
fn test_cli_relative_data_dir_rejected() {
    let mut cmd = Command::cargo_bin("diary").unwrap();
    cmd.env_clear()
        .env("DIARY_DATA_DIR", "relative/dir")
        .env("DIARY_TEST_ENCRYPTION_KEY", "k")
        .arg("list");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Data directory must be an absolute path"));
}

#[test]
fn test_cli_errors_reach_stderr_with_logging_off() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempdir()?;

    base_diary_command(temp_dir.path())
        .args(["--log-level", "off", "write", "-d", "2024-02-01", "-t", " "])
        .assert()
        .failure()
        .stderr("Error: Invalid input: Please write something before saving\n");

    base_diary_command(temp_dir.path())
        .args(["write", "-d", "2024-05-01", "-t", "Secret"])
        .assert()
        .success();

    let mut cmd = Command::cargo_bin("diary")?;
    configure_diary_command(&mut cmd, temp_dir.path(), "a-different-key");
    cmd.env("RUST_LOG", "off")
        .args(["list"])
        .assert()
        .failure()
        .stderr(predicate::str::starts_with(
            "Error: Store error: Failed to initialize entry store",
        ));
    Ok(())
}
