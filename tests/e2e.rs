//! End-to-end tests: spawn the compiled `computo` binary and check its
//! CLI surface from the outside, the same pattern the teacher uses in its
//! own `tests/e2e.rs` (`Command::new(env!("CARGO_BIN_EXE_..."))` with
//! piped output), adapted to Computo's own `--script`/`--tocomputo`/
//! `--tojson`/`--list-operators` contract (§6).

use std::io::Write;
use std::process::{Command, Stdio};

fn write_temp(contents: &str) -> tempfile::TempPath {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    f.into_temp_path()
}

fn computo(args: &[&str]) -> (String, String, bool) {
    let output = Command::new(env!("CARGO_BIN_EXE_computo"))
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("failed to run computo");
    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.success(),
    )
}

#[test]
fn script_mode_evaluates_arithmetic_and_let() {
    let script = write_temp(r#"["let", [["x", 10], ["y", 20]], ["+", ["$", "/x"], ["$", "/y"]]]"#);
    let (stdout, stderr, ok) = computo(&["--script", script.to_str().unwrap()]);
    assert!(ok, "stderr: {stderr}");
    assert_eq!(stdout.trim(), "30");
}

#[test]
fn script_mode_reads_input_files() {
    let script = write_temp(
        r#"["map", ["filter", ["$input", "/users"], ["lambda", ["u"], ["get", ["$", "/u"], "/active"]]], ["lambda", ["u"], ["get", ["$", "/u"], "/name"]]]"#,
    );
    let input = write_temp(
        r#"{"users":[{"name":"Alice","active":true},{"name":"Bob","active":false},{"name":"Charlie","active":true}]}"#,
    );
    let (stdout, stderr, ok) = computo(&["--script", script.to_str().unwrap(), input.to_str().unwrap()]);
    assert!(ok, "stderr: {stderr}");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed, serde_json::json!({"array": ["Alice", "Charlie"]}));
}

#[test]
fn script_mode_accepts_sugar_source() {
    let script = write_temp("let x = 10, y = 20 in x + y");
    let (stdout, stderr, ok) = computo(&["--script", script.to_str().unwrap()]);
    assert!(ok, "stderr: {stderr}");
    assert_eq!(stdout.trim(), "30");
}

#[test]
fn unknown_operator_exits_nonzero_with_diagnostic() {
    let script = write_temp(r#"["fliter", {"array": [1, 2]}, ["lambda", ["x"], true]]"#);
    let (_stdout, stderr, ok) = computo(&["--script", script.to_str().unwrap()]);
    assert!(!ok);
    assert!(stderr.contains("filter"), "expected a suggestion for 'fliter', got: {stderr}");
}

#[test]
fn tocomputo_and_tojson_round_trip() {
    let json_script = write_temp(r#"["+", 1, 2]"#);
    let (sugar, stderr, ok) = computo(&["--tocomputo", json_script.to_str().unwrap()]);
    assert!(ok, "stderr: {stderr}");
    assert_eq!(sugar.trim(), "1 + 2");

    let sugar_script = write_temp("1 + 2");
    let (json, stderr, ok) = computo(&["--tojson", sugar_script.to_str().unwrap()]);
    assert!(ok, "stderr: {stderr}");
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, serde_json::json!(["+", 1, 2]));
}

#[test]
fn list_operators_includes_core_operators() {
    let (stdout, stderr, ok) = computo(&["--list-operators"]);
    assert!(ok, "stderr: {stderr}");
    let names: Vec<String> = serde_json::from_str(&stdout).unwrap();
    for op in ["map", "filter", "reduce", "sort", "diff", "patch", "+", "and"] {
        assert!(names.iter().any(|n| n == op), "missing operator {op} in {names:?}");
    }
}

#[test]
fn no_mode_selected_is_a_usage_error() {
    let output = Command::new(env!("CARGO_BIN_EXE_computo"))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("failed to run computo");
    assert_eq!(output.status.code(), Some(2));
}
