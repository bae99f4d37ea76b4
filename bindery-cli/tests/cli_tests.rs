//! Integration tests for the Bindery CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::io::{Cursor, Write};
use std::path::PathBuf;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

/// Create a text file for testing
fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Create a ZIP archive for testing
fn create_test_zip(dir: &TempDir, name: &str, files: &[(&str, &str)]) -> PathBuf {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (entry, content) in files {
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        writer.start_file(*entry, options).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    let bytes = writer.finish().unwrap().into_inner();

    let path = dir.path().join(name);
    fs::write(&path, bytes).expect("Failed to write test archive");
    path
}

fn bindery() -> Command {
    Command::cargo_bin("bindery").unwrap()
}

fn path_str(path: &std::path::Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_help() {
    bindery()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("import"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("show"))
        .stdout(predicate::str::contains("sanitize"));
}

#[test]
fn test_version() {
    bindery()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("bindery"));
}

#[test]
fn test_import_help() {
    bindery()
        .args(["import", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Import Markdown, HTML and ZIP files"))
        .stdout(predicate::str::contains("--library"))
        .stdout(predicate::str::contains("--book"))
        .stdout(predicate::str::contains("--no-chapters"));
}

#[test]
fn test_import_requires_files() {
    let temp_dir = TempDir::new().unwrap();
    let library = temp_dir.path().join("library.json");

    bindery()
        .args(["import", "--library", path_str(&library), "--book", "Guide"])
        .assert()
        .failure();
}

#[test]
fn test_import_markdown_and_show() {
    let temp_dir = TempDir::new().unwrap();
    let input = create_test_file(&temp_dir, "notes.md", "# Notes\n\nHello");
    let library = temp_dir.path().join("library.json");

    bindery()
        .args([
            "import",
            "--library",
            path_str(&library),
            "--book",
            "Guide",
            path_str(&input),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Import complete: 1 page(s) created."));

    assert!(library.exists());

    bindery()
        .args(["show", "--library", path_str(&library)])
        .assert()
        .success()
        .stdout(predicate::str::contains("Guide (1 pages)"))
        .stdout(predicate::str::contains("- Notes"));
}

#[test]
fn test_import_reports_failures_but_succeeds() {
    let temp_dir = TempDir::new().unwrap();
    let good = create_test_file(&temp_dir, "good.md", "# Good\n");
    let bad = create_test_file(&temp_dir, "bad.txt", "plain");
    let library = temp_dir.path().join("library.json");

    bindery()
        .args([
            "import",
            "--library",
            path_str(&library),
            "--book",
            "Guide",
            path_str(&bad),
            path_str(&good),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 page(s) created"))
        .stdout(predicate::str::contains(
            "Some files failed to import: bad.txt: Unsupported file type 'txt'",
        ));
}

#[test]
fn test_import_json_output() {
    let temp_dir = TempDir::new().unwrap();
    let input = create_test_file(&temp_dir, "page.html", "<h1>Page</h1><p>Body</p>");
    let library = temp_dir.path().join("library.json");

    let output = bindery()
        .args([
            "import",
            "--json",
            "--library",
            path_str(&library),
            "--book",
            "Guide",
            path_str(&input),
        ])
        .assert()
        .success();

    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("Output should be valid JSON");
    assert_eq!(json["pages_created"], 1);
    assert_eq!(json["chapters_created"], 0);
    assert!(json["failures"].as_array().unwrap().is_empty());
}

#[test]
fn test_import_zip_with_chapters() {
    let temp_dir = TempDir::new().unwrap();
    let archive = create_test_zip(
        &temp_dir,
        "bundle.zip",
        &[("ch1/a.md", "# A\n"), ("b.md", "# B\n"), ("image.png", "png")],
    );
    let library = temp_dir.path().join("library.json");

    let output = bindery()
        .args([
            "import",
            "--json",
            "--library",
            path_str(&library),
            "--book",
            "Guide",
            path_str(&archive),
        ])
        .assert()
        .success();

    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["pages_created"], 2);
    assert_eq!(json["chapters_created"], 1);

    bindery()
        .args(["show", "--library", path_str(&library)])
        .assert()
        .success()
        .stdout(predicate::str::contains("[ch1]"))
        .stdout(predicate::str::contains("    - A"));
}

#[test]
fn test_show_json_outline() {
    let temp_dir = TempDir::new().unwrap();
    let archive = create_test_zip(
        &temp_dir,
        "bundle.zip",
        &[("ch1/a.md", "# A\n\nbody"), ("b.md", "# B\n")],
    );
    let library = temp_dir.path().join("library.json");

    bindery()
        .args([
            "import",
            "--library",
            path_str(&library),
            "--book",
            "Guide",
            path_str(&archive),
        ])
        .assert()
        .success();

    let output = bindery()
        .args(["show", "--json", "--library", path_str(&library)])
        .assert()
        .success();

    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let book = &json[0];
    assert_eq!(book["name"], "Guide");
    assert_eq!(book["total_pages"], 2);
    assert_eq!(book["pages"], serde_json::json!(["B"]));
    assert_eq!(book["chapters"][0]["name"], "ch1");
    assert_eq!(book["chapters"][0]["pages"], serde_json::json!(["A"]));
    assert!(book.get("html").is_none());
}

#[test]
fn test_import_zip_flat() {
    let temp_dir = TempDir::new().unwrap();
    let archive = create_test_zip(&temp_dir, "bundle.zip", &[("ch1/a.md", "# A\n")]);
    let library = temp_dir.path().join("library.json");

    let output = bindery()
        .args([
            "import",
            "--json",
            "--no-chapters",
            "--library",
            path_str(&library),
            "--book",
            "Guide",
            path_str(&archive),
        ])
        .assert()
        .success();

    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["pages_created"], 1);
    assert_eq!(json["chapters_created"], 0);
}

#[test]
fn test_import_archives_disabled() {
    let temp_dir = TempDir::new().unwrap();
    let archive = create_test_zip(&temp_dir, "bundle.zip", &[("a.md", "a")]);
    let library = temp_dir.path().join("library.json");

    bindery()
        .args([
            "import",
            "--no-archives",
            "--library",
            path_str(&library),
            "--book",
            "Guide",
            path_str(&archive),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("ZIP imports are disabled"));
}

#[test]
fn test_import_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let library = temp_dir.path().join("library.json");

    bindery()
        .args([
            "import",
            "--library",
            path_str(&library),
            "--book",
            "Guide",
            "/nonexistent/notes.md",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read input file"));
}

#[test]
fn test_plan() {
    let temp_dir = TempDir::new().unwrap();
    let archive = create_test_zip(
        &temp_dir,
        "bundle.zip",
        &[("ch1/a.md", "a"), ("b.md", "b"), ("__MACOSX/._b.md", "x")],
    );

    bindery()
        .args(["plan", path_str(&archive)])
        .assert()
        .success()
        .stdout(predicate::str::contains("b.md -> (book root)"))
        .stdout(predicate::str::contains("ch1/a.md -> ch1"))
        .stdout(predicate::str::contains("__MACOSX").not());
}

#[test]
fn test_plan_json_without_chapters() {
    let temp_dir = TempDir::new().unwrap();
    let archive = create_test_zip(&temp_dir, "bundle.zip", &[("ch1/a.md", "a"), ("b.md", "b")]);

    let output = bindery()
        .args(["plan", "--json", "--no-chapters", path_str(&archive)])
        .assert()
        .success();

    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let items = json.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["path"], "b.md");
    assert!(items.iter().all(|item| item["chapter"].is_null()));
}

#[test]
fn test_plan_not_a_zip() {
    let temp_dir = TempDir::new().unwrap();
    let fake = create_test_file(&temp_dir, "fake.zip", "this is certainly not a zip archive");

    bindery()
        .args(["plan", path_str(&fake)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read archive"));
}

#[test]
fn test_show_missing_library() {
    bindery()
        .args(["show", "--library", "/nonexistent/library.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Library not found"));
}

#[test]
fn test_sanitize_html() {
    let temp_dir = TempDir::new().unwrap();
    let input = create_test_file(
        &temp_dir,
        "page.html",
        "<p onclick=\"steal()\">Safe</p><script>alert(1)</script>",
    );

    bindery()
        .args(["sanitize", path_str(&input)])
        .assert()
        .success()
        .stdout(predicate::str::contains("<p>Safe</p>"))
        .stdout(predicate::str::contains("script").not())
        .stdout(predicate::str::contains("onclick").not());
}

#[test]
fn test_sanitize_markdown() {
    let temp_dir = TempDir::new().unwrap();
    let input = create_test_file(&temp_dir, "doc.md", "# Title\n\n[x](javascript:alert(1))\n");

    bindery()
        .args(["sanitize", path_str(&input)])
        .assert()
        .success()
        .stdout(predicate::str::contains("<h1>Title</h1>"))
        .stdout(predicate::str::contains("<a>x</a>"));
}

#[test]
fn test_sanitize_unsupported() {
    let temp_dir = TempDir::new().unwrap();
    let input = create_test_file(&temp_dir, "notes.txt", "text");

    bindery()
        .args(["sanitize", path_str(&input)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file type 'txt'"));
}

#[test]
fn test_sanitize_invalid_jobs() {
    let temp_dir = TempDir::new().unwrap();
    let input = create_test_file(&temp_dir, "page.html", "<p>x</p>");

    bindery()
        .args(["sanitize", "--jobs", "0", path_str(&input)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("jobs must be at least 1"));
}
