//! End-to-end tests for the verify command, run against the built binary.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_chunkgate"))
}

fn chunk(seq: i64, chunk_id: &str, prev: Option<&str>, next: Option<&str>) -> Value {
    json!({
        "id": format!("doc-1#{chunk_id}"),
        "chunk_id": chunk_id,
        "doc_id": "doc-1",
        "section_index": 1,
        "chunk_seq": seq,
        "section_id": "sec-1",
        "chunk_type": "section",
        "section_path": ["Part 1", "Chapter 2"],
        "section_title": "Chapter 2",
        "page_start": 3,
        "page_end": 4,
        "locators": {"spans": [{
            "source_pdf": "rules.pdf",
            "pdf_page_start": 10,
            "pdf_page_end": 11,
            "doc_page_start": 3,
            "doc_page_end": 4
        }]},
        "context_prefix": "Part 1 > Chapter 2",
        "text": "Plating shall not be less than 0.5 mm in thickness.",
        "split": null,
        "prev_chunk_id": prev,
        "next_chunk_id": next,
        "images": [],
        "tables": [],
        "tables_data": {},
        "references": [{"target": "Ch 3", "type": "internal", "relation": "requires"}],
        "equations": [],
        "keywords": ["plating"]
    })
}

fn valid_dataset() -> Value {
    json!({"chunks": [
        chunk(0, "c-000", None, Some("c-001")),
        chunk(1, "c-001", Some("c-000"), Some("c-002")),
        chunk(2, "c-002", Some("c-001"), None),
    ]})
}

fn write_dataset(dir: &Path, dataset: &Value) -> std::path::PathBuf {
    let path = dir.join("chunks.json");
    fs::write(&path, serde_json::to_vec_pretty(dataset).unwrap()).unwrap();
    path
}

#[test]
fn verify_help() {
    cli()
        .arg("verify")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("chunks.json"));
}

#[test]
fn valid_dataset_passes() {
    let dir = TempDir::new().unwrap();
    let path = write_dataset(dir.path(), &valid_dataset());

    cli()
        .arg("verify")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Overall: PASS"));
}

#[test]
fn duplicated_seq_fails_with_exit_code_one() {
    let dir = TempDir::new().unwrap();
    let mut dataset = valid_dataset();
    dataset["chunks"][1]["chunk_seq"] = json!(2);
    let path = write_dataset(dir.path(), &dataset);

    cli()
        .arg("verify")
        .arg(&path)
        .arg("--verbose")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Overall: FAIL"))
        .stdout(predicate::str::contains("duplicate_seq"));
}

#[test]
fn malformed_json_fails_without_writing_an_export() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("chunks.json");
    fs::write(&path, "{not json").unwrap();
    let export = dir.path().join("report.json");

    cli()
        .arg("verify")
        .arg(&path)
        .arg("--export")
        .arg(&export)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to parse"));

    assert!(!export.exists());
}

#[test]
fn export_writes_a_parseable_report() {
    let dir = TempDir::new().unwrap();
    let path = write_dataset(dir.path(), &valid_dataset());
    let export = dir.path().join("report.json");

    cli()
        .arg("verify")
        .arg(&path)
        .arg("--export")
        .arg(&export)
        .assert()
        .success();

    let report: Value = serde_json::from_slice(&fs::read(&export).unwrap()).unwrap();
    assert_eq!(report["overall_pass"], json!(true));
    assert_eq!(report["total_chunks"], json!(3));
    assert_eq!(report["schema"]["ok"], json!(true));
    assert_eq!(report["json_file"], json!("chunks.json"));
    assert!(report["coverage"].is_null());
}

#[test]
fn source_text_enables_the_fidelity_checks() {
    let dir = TempDir::new().unwrap();
    let path = write_dataset(dir.path(), &valid_dataset());
    let source = dir.path().join("source.txt");
    fs::write(
        &source,
        "Plating shall not be less than 0.5 mm in thickness.\n",
    )
    .unwrap();

    cli()
        .arg("verify")
        .arg(&path)
        .arg("--source-text")
        .arg(&source)
        .assert()
        .success()
        .stdout(predicate::str::contains("[coverage]  OK"))
        .stdout(predicate::str::contains("[numeric]   OK"))
        .stdout(predicate::str::contains("Overall: PASS"));
}

#[test]
fn unmatched_items_are_logged_beside_the_input() {
    let dir = TempDir::new().unwrap();
    let path = write_dataset(dir.path(), &valid_dataset());
    let source = dir.path().join("source.txt");
    fs::write(
        &source,
        "Anchoring equipment shall be tested before delivery inspection.\n",
    )
    .unwrap();

    cli()
        .arg("verify")
        .arg(&path)
        .arg("--source-text")
        .arg(&source)
        .assert()
        .code(1);

    let log = dir.path().join("unmatched").join("chunks.unmatched.txt");
    let contents = fs::read_to_string(&log).unwrap();
    assert!(contents.contains("unmatched coverage sentences: 1"));
    assert!(contents.contains("Anchoring"));
}

#[test]
fn explicit_unmatched_log_is_written_even_when_everything_matches() {
    let dir = TempDir::new().unwrap();
    let path = write_dataset(dir.path(), &valid_dataset());
    let source = dir.path().join("source.txt");
    fs::write(
        &source,
        "Plating shall not be less than 0.5 mm in thickness.\n",
    )
    .unwrap();
    let log = dir.path().join("diag.txt");

    cli()
        .arg("verify")
        .arg(&path)
        .arg("--source-text")
        .arg(&source)
        .arg("--unmatched-log")
        .arg(&log)
        .assert()
        .success();

    let contents = fs::read_to_string(&log).unwrap();
    assert!(contents.contains("unmatched coverage sentences: 0"));
    assert!(contents.contains("unmatched numeric assertions: 0"));
}
