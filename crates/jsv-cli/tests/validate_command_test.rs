use std::fs;
use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

fn jsv() -> Command {
    Command::new(env!("CARGO_BIN_EXE_jsv"))
}

fn write_file(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, contents).expect("fixture should be writable");
    path.to_string_lossy().into_owned()
}

fn assert_exit_code(output: &std::process::Output, expected: i32, context: &str) {
    let code = output.status.code().unwrap_or(-1);
    assert_eq!(
        code,
        expected,
        "{context} (exit code {code}); stdout: {}; stderr: {}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn validate_reports_ok_and_exits_zero() {
    let dir = TempDir::new().expect("temp dir");
    let schema = write_file(
        dir.path(),
        "schema.json",
        r#"{"type": "object", "required": ["id"]}"#,
    );
    let instance = write_file(dir.path(), "good.json", r#"{"id": 7}"#);

    let output = jsv()
        .args(["validate", instance.as_str(), "-s", schema.as_str()])
        .output()
        .expect("run jsv validate");

    assert_exit_code(&output, 0, "expected a conforming instance");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("good.json: ok"), "stdout: {stdout}");
}

#[test]
fn validate_prints_violations_and_exits_two() {
    let dir = TempDir::new().expect("temp dir");
    let schema = write_file(
        dir.path(),
        "schema.json",
        r#"{"properties": {"age": {"type": "integer"}}, "required": ["age"]}"#,
    );
    let instance = write_file(dir.path(), "bad.json", r#"{"age": "ten"}"#);

    let output = jsv()
        .args(["validate", instance.as_str(), "-s", schema.as_str()])
        .output()
        .expect("run jsv validate");

    assert_exit_code(&output, 2, "expected violations to be reported");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("bad.json: 1 violation(s)"), "stdout: {stdout}");
    assert!(
        stdout.contains("#/age: [type] Expected integer, found string"),
        "stdout: {stdout}"
    );
}

#[test]
fn validate_follows_references_between_files() {
    let dir = TempDir::new().expect("temp dir");
    write_file(
        dir.path(),
        "defs.json",
        r#"{"definitions": {"port": {"type": "integer", "maximum": 65535}}}"#,
    );
    let schema = write_file(
        dir.path(),
        "schema.json",
        r#"{"properties": {"port": {"$ref": "defs.json#/definitions/port"}}}"#,
    );
    let good = write_file(dir.path(), "good.json", r#"{"port": 443}"#);
    let bad = write_file(dir.path(), "bad.json", r#"{"port": 70000}"#);

    let output = jsv()
        .args(["validate", good.as_str(), bad.as_str(), "-s", schema.as_str()])
        .output()
        .expect("run jsv validate");

    assert_exit_code(&output, 2, "expected the second instance to fail");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("good.json: ok"), "stdout: {stdout}");
    assert!(stdout.contains("[maximum]"), "stdout: {stdout}");
}

#[test]
fn check_verifies_references() {
    let dir = TempDir::new().expect("temp dir");
    write_file(dir.path(), "leaf.json", r#"{"type": "string"}"#);
    let schema = write_file(dir.path(), "schema.json", r#"{"$ref": "leaf.json"}"#);

    let output = jsv()
        .args(["check", schema.as_str()])
        .output()
        .expect("run jsv check");

    assert_exit_code(&output, 0, "expected references to resolve");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("2 document(s)"), "stdout: {stdout}");
}

#[test]
fn check_fails_on_dangling_references() {
    let dir = TempDir::new().expect("temp dir");
    let schema = write_file(dir.path(), "schema.json", r#"{"$ref": "missing.json"}"#);

    let output = jsv()
        .args(["check", schema.as_str()])
        .output()
        .expect("run jsv check");

    assert_exit_code(&output, 1, "expected the dangling reference to fail the load");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("missing.json"), "stderr: {stderr}");
}

#[test]
fn yaml_schemas_load_by_extension() {
    let dir = TempDir::new().expect("temp dir");
    let schema = write_file(dir.path(), "schema.yaml", "type: integer\nminimum: 3\n");
    let instance = write_file(dir.path(), "n.json", "2");

    let output = jsv()
        .args(["validate", instance.as_str(), "-s", schema.as_str()])
        .output()
        .expect("run jsv validate");

    assert_exit_code(&output, 2, "expected the yaml schema to apply");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[minimum]"), "stdout: {stdout}");
}

#[test]
fn unreadable_instances_are_an_error_not_a_violation() {
    let dir = TempDir::new().expect("temp dir");
    let schema = write_file(dir.path(), "schema.json", r#"{"type": "object"}"#);
    let missing = dir.path().join("absent.json");

    let output = jsv()
        .args(["validate", missing.to_string_lossy().as_ref(), "-s", schema.as_str()])
        .output()
        .expect("run jsv validate");

    assert_exit_code(&output, 1, "expected the missing instance to be an error");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("absent.json"), "stderr: {stderr}");
}
