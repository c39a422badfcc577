use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn fixture_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("crates/credilens/tests/fixtures/sample_extraction.json")
}

fn credilens(storage: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_credilens"))
        .args(args)
        .env("CREDILENS_STORAGE_DIR", storage)
        .env("CREDILENS_LOG_LEVEL", "warn")
        .env_remove("RUST_LOG")
        .env_remove("CREDILENS_SCORING_CONFIG")
        .env_remove("CREDILENS_RATIO_TABLE")
        .env_remove("CREDILENS_VIEWER_ROUTE")
        .output()
        .expect("credilens binary runs")
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("utf8 stdout")
}

#[test]
fn analyze_writes_artifacts_and_prints_summary() {
    let storage = tempfile::tempdir().expect("temp dir");
    let fixture = fixture_path();
    let output = credilens(
        storage.path(),
        &[
            "analyze",
            fixture.to_str().expect("utf8 path"),
            "--doc-id",
            "1709294400-0a1b2c",
        ],
    );

    assert!(output.status.success(), "{output:?}");
    let text = stdout(&output);
    assert!(text.contains("Credit analysis for Northwind Instruments Inc. (1709294400-0a1b2c)"));
    assert!(text.contains("Final score: 83.30"));
    assert!(text.contains("- CURRENT_RATIO: 1.60x"));
    assert!(text.contains("- GROSS_MARGIN: 42.00%"));
    assert!(text.contains("- A=L+E: pass"));

    let dir = storage.path().join("outputs/1709294400-0a1b2c");
    assert!(dir.join("score.json").is_file());
    assert!(dir.join("ratios.csv").is_file());

    let recent = credilens(storage.path(), &["recent", "--limit", "5"]);
    assert!(recent.status.success(), "{recent:?}");
    assert!(stdout(&recent).contains("- 1709294400-0a1b2c | Northwind Instruments Inc. |"));
}

#[test]
fn analyze_json_output_is_machine_readable() {
    let storage = tempfile::tempdir().expect("temp dir");
    let fixture = fixture_path();
    let output = credilens(
        storage.path(),
        &["analyze", fixture.to_str().expect("utf8 path"), "--json"],
    );

    assert!(output.status.success(), "{output:?}");
    let analysis: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(analysis["score"]["final_score"], 83.3);
    let doc_id = analysis["doc_id"].as_str().expect("doc id string");
    assert!(storage.path().join("outputs").join(doc_id).is_dir());
}

#[test]
fn ratios_command_emits_csv() {
    let storage = tempfile::tempdir().expect("temp dir");
    let fixture = fixture_path();
    let output = credilens(
        storage.path(),
        &["ratios", fixture.to_str().expect("utf8 path"), "--csv"],
    );

    assert!(output.status.success(), "{output:?}");
    let text = stdout(&output);
    assert_eq!(text.lines().count(), 13);
    assert!(text.contains("\nASSET_TURNOVER,1.25,multiple,false,"));
}

#[test]
fn missing_payload_exits_with_application_error() {
    let storage = tempfile::tempdir().expect("temp dir");
    let output = credilens(storage.path(), &["check", "does-not-exist.json"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("application error: import error"));
}
