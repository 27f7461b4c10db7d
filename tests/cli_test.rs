//! CLI integration tests for the sqlpretty binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper: get a Command for the sqlpretty binary.
fn sqlpretty() -> Command {
    Command::cargo_bin("sqlpretty").expect("binary should exist")
}

/// Helper: create a temp directory holding the given files.
fn setup_temp_dir(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().expect("create temp dir");
    for (name, content) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
    }
    dir
}

// ─── Preformatted files (should be left unchanged) ───

#[test]
fn test_preformatted_file_unchanged() {
    let dir = setup_temp_dir(&[("query.sql", "SELECT 1\n")]);
    sqlpretty()
        .arg(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("1 unchanged"));
}

#[test]
fn test_preformatted_check_mode_passes() {
    let dir = setup_temp_dir(&[("query.sql", "SELECT 1\n")]);
    sqlpretty().arg("--check").arg(dir.path()).assert().success();
}

#[test]
fn test_verbose_lists_files() {
    let dir = setup_temp_dir(&[("query.sql", "SELECT 1\n")]);
    sqlpretty()
        .arg("--verbose")
        .arg(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("unchanged").and(predicate::str::contains("query.sql")));
}

// ─── Unformatted files (should be reformatted) ───

#[test]
fn test_unformatted_file_reformatted() {
    let dir = setup_temp_dir(&[("query.sql", "select    a,b from t\n")]);
    sqlpretty()
        .arg(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("1 reformatted"));

    let content = fs::read_to_string(dir.path().join("query.sql")).unwrap();
    assert_eq!(content, "SELECT a, b FROM t\n");
}

#[test]
fn test_line_length_flag_controls_breaking() {
    let dir = setup_temp_dir(&[("query.sql", "select a,b from t where x=1\n")]);
    sqlpretty()
        .arg("-l")
        .arg("10")
        .arg(dir.path())
        .assert()
        .success();

    let content = fs::read_to_string(dir.path().join("query.sql")).unwrap();
    assert_eq!(content, "SELECT\n  a,\n  b\nFROM\n  t\nWHERE\n  x = 1\n");
}

#[test]
fn test_unformatted_check_mode_fails() {
    let dir = setup_temp_dir(&[("query.sql", "select    1\n")]);
    sqlpretty()
        .arg("--check")
        .arg(dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("would be reformatted"));

    // File should NOT be modified in check mode
    let content = fs::read_to_string(dir.path().join("query.sql")).unwrap();
    assert_eq!(content, "select    1\n");
}

#[test]
fn test_unformatted_diff_mode_shows_diff() {
    let dir = setup_temp_dir(&[("query.sql", "select    1\n")]);
    // --diff alone shows the diff but exits 0 (only --check triggers exit 1)
    sqlpretty()
        .arg("--diff")
        .arg("--no-color")
        .arg(dir.path())
        .assert()
        .success()
        .stderr(
            predicate::str::contains("-select    1").and(predicate::str::contains("+SELECT 1")),
        );

    let content = fs::read_to_string(dir.path().join("query.sql")).unwrap();
    assert_eq!(content, "select    1\n");
}

#[test]
fn test_unformatted_diff_check_combined() {
    let dir = setup_temp_dir(&[("query.sql", "select    1\n")]);
    sqlpretty()
        .arg("--check")
        .arg("--diff")
        .arg(dir.path())
        .assert()
        .code(1);
}

// ─── Stdin mode ───

#[test]
fn test_stdin_formats_sql() {
    sqlpretty()
        .arg("-")
        .write_stdin("select a,b from t where x=1")
        .assert()
        .success()
        .stdout("SELECT a, b FROM t WHERE x = 1\n");
}

#[test]
fn test_stdin_respects_line_length() {
    sqlpretty()
        .arg("-")
        .arg("--line-length")
        .arg("10")
        .write_stdin("select a,b from t where x=1")
        .assert()
        .success()
        .stdout("SELECT\n  a,\n  b\nFROM\n  t\nWHERE\n  x = 1\n");
}

#[test]
fn test_stdin_lex_error_exits_with_code_2() {
    sqlpretty()
        .arg("-")
        .write_stdin("select 'oops")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("lex error at position 7"));
}

#[test]
fn test_zero_line_length_is_a_config_error() {
    sqlpretty()
        .arg("-")
        .arg("-l")
        .arg("0")
        .write_stdin("select 1")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Configuration error"));
}

// ─── Error handling ───

#[test]
fn test_error_file_exits_with_code_2() {
    let dir = setup_temp_dir(&[("bad.sql", "select from from\n")]);
    sqlpretty()
        .arg(dir.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("parse error"));

    let content = fs::read_to_string(dir.path().join("bad.sql")).unwrap();
    assert_eq!(content, "select from from\n");
}

#[test]
fn test_error_with_check_mode() {
    let dir = setup_temp_dir(&[("bad.sql", "select 'oops\n")]);
    sqlpretty().arg("--check").arg(dir.path()).assert().code(2);
}

// ─── Multiple files ───

#[test]
fn test_multiple_files_mixed_status() {
    let dir = setup_temp_dir(&[
        ("formatted.sql", "SELECT 1\n"),
        ("unformatted.sql", "select    2;\n\n\nselect 3;\n"),
    ]);
    sqlpretty()
        .arg(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("2 file(s) processed"));

    assert_eq!(
        fs::read_to_string(dir.path().join("formatted.sql")).unwrap(),
        "SELECT 1\n"
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("unformatted.sql")).unwrap(),
        "SELECT 2;\n\nSELECT 3;\n"
    );
}

#[test]
fn test_single_process_matches_parallel() {
    let dir = setup_temp_dir(&[
        ("a.sql", "select    1\n"),
        ("b.sql", "select    2\n"),
        ("c.sql", "select    3\n"),
    ]);
    sqlpretty()
        .arg("--single-process")
        .arg(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("3 reformatted"));
}

// ─── File discovery ───

#[test]
fn test_discovers_sql_files_recursively() {
    let dir = setup_temp_dir(&[
        ("top.sql", "SELECT 1\n"),
        ("subdir/nested.sql", "SELECT 2\n"),
        (".hidden/skipped.sql", "SELECT 3\n"),
    ]);
    sqlpretty()
        .arg(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("2 file(s) processed"));
}

#[test]
fn test_ignores_non_sql_files() {
    let dir = setup_temp_dir(&[
        ("query.sql", "SELECT 1\n"),
        ("readme.md", "# Not SQL\n"),
        ("data.csv", "a,b,c\n"),
    ]);
    sqlpretty()
        .arg(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("1 file(s) processed"));
}

#[test]
fn test_exclude_pattern() {
    let dir = setup_temp_dir(&[("keep.sql", "SELECT 1\n"), ("old_query.sql", "select 1\n")]);
    sqlpretty()
        .arg("--exclude")
        .arg("old_*")
        .arg(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("1 file(s) processed"));

    assert_eq!(
        fs::read_to_string(dir.path().join("old_query.sql")).unwrap(),
        "select 1\n"
    );
}

#[test]
fn test_empty_directory() {
    let dir = TempDir::new().expect("create temp dir");
    sqlpretty()
        .arg(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("0 file(s) processed"));
}

// ─── Configuration ───

#[test]
fn test_config_file_sets_line_length() {
    let dir = setup_temp_dir(&[
        ("sqlpretty.toml", "line_length = 10\n"),
        ("query.sql", "select a,b from t\n"),
    ]);
    sqlpretty().arg(dir.path()).assert().success();

    let content = fs::read_to_string(dir.path().join("query.sql")).unwrap();
    assert_eq!(content, "SELECT\n  a,\n  b\nFROM\n  t\n");
}

#[test]
fn test_flag_overrides_config_file() {
    let dir = setup_temp_dir(&[
        ("sqlpretty.toml", "line_length = 10\n"),
        ("query.sql", "select a,b from t\n"),
    ]);
    sqlpretty().arg("-l").arg("80").arg(dir.path()).assert().success();

    let content = fs::read_to_string(dir.path().join("query.sql")).unwrap();
    assert_eq!(content, "SELECT a, b FROM t\n");
}

#[test]
fn test_unknown_config_key_exits_with_code_2() {
    let dir = setup_temp_dir(&[
        ("sqlpretty.toml", "dialect = \"duckdb\"\n"),
        ("query.sql", "select 1\n"),
    ]);
    sqlpretty()
        .arg(dir.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unknown config option: dialect"));
}

// ─── Quiet mode ───

#[test]
fn test_quiet_mode_suppresses_summary() {
    let dir = setup_temp_dir(&[("query.sql", "SELECT 1\n")]);
    sqlpretty()
        .arg("--quiet")
        .arg(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_quiet_mode_with_check() {
    let dir = setup_temp_dir(&[("query.sql", "select    1\n")]);
    sqlpretty()
        .arg("--quiet")
        .arg("--check")
        .arg(dir.path())
        .assert()
        .code(1);
}

#[test]
fn test_requires_a_path() {
    sqlpretty().assert().failure();
}
