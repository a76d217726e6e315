//! End-to-end tests for the sheetgen binary: gen, check and split, with and
//! without --json.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn sheetgen_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_sheetgen"))
}

fn run(args: &[&str], dir: &Path) -> Output {
    sheetgen_bin()
        .args(args)
        .current_dir(dir)
        .output()
        .expect("Failed to execute command")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).unwrap_or_else(|_| panic!("Failed to parse JSON: {}", stdout))
}

fn line_count(path: &Path) -> usize {
    fs::read_to_string(path).unwrap().lines().count()
}

#[test]
fn test_gen_counts_header_as_row() {
    let temp_dir = TempDir::new().unwrap();

    let output = run(
        &["gen", "--name", "test", "--rows", "4", "--seed", "1"],
        temp_dir.path(),
    );
    assert!(output.status.success());

    let path = temp_dir.path().join("output").join("test.csv");
    assert_eq!(line_count(&path), 4);
    let content = fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("file,date\n"));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[*] Generating"));
    assert!(stdout.contains("[+] Generated"));
}

#[test]
fn test_gen_single_row_is_header_only() {
    let temp_dir = TempDir::new().unwrap();

    let output = run(
        &["gen", "-n", "empty", "-r", "1", "-o", "out"],
        temp_dir.path(),
    );
    assert!(output.status.success());
    assert_eq!(
        fs::read_to_string(temp_dir.path().join("out").join("empty.csv")).unwrap(),
        "file,date\n"
    );
}

#[test]
fn test_gen_zero_rows_fails() {
    let temp_dir = TempDir::new().unwrap();

    let output = run(&["gen", "--name", "x", "--rows", "0"], temp_dir.path());
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--rows"));
}

#[test]
fn test_gen_with_rotation_json() {
    let temp_dir = TempDir::new().unwrap();

    let output = run(
        &[
            "gen",
            "--name",
            "big",
            "--rows",
            "6",
            "--max-rows-per-file",
            "2",
            "--seed",
            "3",
            "--json",
        ],
        temp_dir.path(),
    );
    assert!(output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["records"], 5);
    assert_eq!(json["seed"], 3);
    assert_eq!(json["files"].as_array().unwrap().len(), 3);

    let out = temp_dir.path().join("output");
    assert_eq!(line_count(&out.join("big_1.csv")), 3);
    assert_eq!(line_count(&out.join("big_2.csv")), 3);
    assert_eq!(line_count(&out.join("big_3.csv")), 2);
    assert!(!out.join("big.csv").exists());
}

#[test]
fn test_gen_is_reproducible_with_seed() {
    let temp_dir = TempDir::new().unwrap();

    for dir in ["a", "b"] {
        let output = run(
            &["gen", "-n", "s", "-r", "50", "--seed", "99", "-o", dir],
            temp_dir.path(),
        );
        assert!(output.status.success());
    }

    let a = fs::read_to_string(temp_dir.path().join("a").join("s.csv")).unwrap();
    let b = fs::read_to_string(temp_dir.path().join("b").join("s.csv")).unwrap();
    // Dates are bounded by today, so only compare the file names column.
    let files = |s: &str| -> Vec<String> {
        s.lines()
            .map(|l| l.split(',').next().unwrap().to_string())
            .collect()
    };
    assert_eq!(files(&a), files(&b));
}

#[test]
fn test_check_reports_rows() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("ten.csv");
    let content: String = (0..10).map(|i| format!("{},x\n", i)).collect();
    fs::write(&path, content).unwrap();

    let output = run(&["check", "ten.csv"], temp_dir.path());
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("ten.csv has 10 rows"));

    let output = run(&["check", "ten.csv", "--json"], temp_dir.path());
    let json = stdout_json(&output);
    assert_eq!(json["rows"], 10);
}

#[test]
fn test_check_missing_file_fails() {
    let temp_dir = TempDir::new().unwrap();

    let output = run(&["check", "nope.csv"], temp_dir.path());
    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("does not exist"));
}

#[test]
fn test_split_command() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("data.csv"),
        "id,name\n1,a\n2,b\n3,c\n4,d\n",
    )
    .unwrap();

    let output = run(
        &["split", "data.csv", "--max-rows-per-file", "2"],
        temp_dir.path(),
    );
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("into 3 files"));

    let out = temp_dir.path().join("output");
    assert_eq!(line_count(&out.join("data_1.csv")), 2);
    assert_eq!(line_count(&out.join("data_2.csv")), 2);
    assert_eq!(line_count(&out.join("data_3.csv")), 1);
}

#[test]
fn test_split_accepts_underscore_flag() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("data.csv"), "1\n2\n3\n").unwrap();

    let output = run(
        &["split", "data.csv", "--max_rows_per_file", "1"],
        temp_dir.path(),
    );
    assert!(output.status.success());
    assert!(temp_dir.path().join("output").join("data_3.csv").exists());
}

#[test]
fn test_split_json_dry_run() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("data.csv"), "1\n2\n3\n4\n5\n").unwrap();

    let output = run(
        &["split", "data.csv", "-m", "2", "--dry-run", "--json"],
        temp_dir.path(),
    );
    assert!(output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["dry_run"], true);
    assert_eq!(json["max_rows_per_file"], 2);
    assert_eq!(json["statistics"]["rows_processed"], 5);
    assert_eq!(json["statistics"]["files_created"], 0);
    assert_eq!(json["files"].as_array().unwrap().len(), 3);
    assert!(!temp_dir.path().join("output").exists());
}

#[test]
fn test_split_zero_budget_fails() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("data.csv"), "1\n").unwrap();

    let output = run(&["split", "data.csv", "-m", "0"], temp_dir.path());
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("row budget"));
}

#[test]
fn test_config_file_settings() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("sheetgen.yaml"),
        r#"
output_dir: generated
max_rows_per_file: 3
fields:
  - { name: owner, kind: name }
  - { name: created, kind: date }
"#,
    )
    .unwrap();

    let output = run(
        &["--config", "sheetgen.yaml", "gen", "-n", "people", "-r", "5"],
        temp_dir.path(),
    );
    assert!(output.status.success());

    let dir = temp_dir.path().join("generated");
    let content = fs::read_to_string(dir.join("people.csv")).unwrap();
    assert!(content.starts_with("owner,created\n"));
    assert_eq!(content.lines().count(), 5);
    assert!(!dir.join("people_1.csv").exists());
}

#[test]
fn test_config_budget_applies_to_split() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("sheetgen.yaml"), "max_rows_per_file: 2\n").unwrap();
    fs::write(temp_dir.path().join("data.csv"), "1\n2\n3\n").unwrap();

    let output = run(
        &["--config", "sheetgen.yaml", "split", "data.csv"],
        temp_dir.path(),
    );
    assert!(output.status.success());

    let dir = temp_dir.path().join("output");
    assert_eq!(line_count(&dir.join("data_1.csv")), 2);
    assert_eq!(line_count(&dir.join("data_2.csv")), 1);
}

#[test]
fn test_completions() {
    let temp_dir = TempDir::new().unwrap();

    let output = run(&["completions", "bash"], temp_dir.path());
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("sheetgen"));
}
