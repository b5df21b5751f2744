//! Binary-level checks: exit status and user-facing reports

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run(root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_concept-map"))
        .arg("--root")
        .arg(root)
        .args(args)
        .env_remove("CONCEPT_MAP_LOG")
        .output()
        .expect("failed to run concept-map binary")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn state_file(root: &Path) -> std::path::PathBuf {
    root.join(".concept-map/concepts_map.json")
}

#[test]
fn test_full_workflow() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    fs::write(
        root.join("taxonomy.json"),
        r#"{"concepts": [{"name": "Decorators", "description": "wrap functions"}]}"#,
    )
    .unwrap();
    fs::write(root.join("app.py"), "\n\nclass MyClass:\n    def method(self):\n        pass\n").unwrap();

    let init = run(root, &["init", "demo"]);
    assert!(init.status.success());
    assert!(stdout(&init).contains("Initialized concept map for 'demo'"));
    assert!(state_file(root).is_file());

    let load = run(root, &["load-concepts", root.join("taxonomy.json").to_str().unwrap()]);
    assert!(load.status.success());
    assert!(stdout(&load).contains("Loaded 1 new concepts"));

    let file = root.join("app.py");
    let add = run(
        root,
        &[
            "add",
            "decorators",
            "--file",
            file.to_str().unwrap(),
            "--identifier",
            "MyClass",
            "--type",
            "class_definition",
            "--evidence",
            "example",
        ],
    );
    assert!(add.status.success(), "stderr: {}", stderr(&add));
    assert!(stdout(&add).contains("(3-5)"));

    let status = run(root, &["status", "--json"]);
    assert!(status.status.success());
    let report: serde_json::Value = serde_json::from_str(&stdout(&status)).unwrap();
    assert_eq!(report["project"], "demo");
    assert_eq!(report["concepts"][0]["implementations"], 1);
}

#[test]
fn test_init_twice_reports_existing() {
    let tmp = TempDir::new().unwrap();
    assert!(run(tmp.path(), &["init", "demo"]).status.success());

    let again = run(tmp.path(), &["init", "demo"]);
    assert!(again.status.success());
    assert!(stdout(&again).contains("already exists"));
}

#[test]
fn test_recoverable_failures_exit_zero() {
    let tmp = TempDir::new().unwrap();

    let no_state = run(tmp.path(), &["status"]);
    assert!(no_state.status.success());
    assert!(stderr(&no_state).contains("No state file found"));

    assert!(run(tmp.path(), &["init", "demo"]).status.success());
    let missing_concept = run(
        tmp.path(),
        &[
            "add", "Nope", "--file", "x.py", "--lines", "1-2", "--type", "t", "--evidence", "e",
        ],
    );
    assert!(missing_concept.status.success());
    assert!(stderr(&missing_concept).contains("Concept 'Nope' not found"));
}

#[test]
fn test_empty_status_is_explicit() {
    let tmp = TempDir::new().unwrap();
    assert!(run(tmp.path(), &["init", "demo"]).status.success());

    let status = run(tmp.path(), &["status"]);
    assert!(status.status.success());
    assert!(stdout(&status).contains("No concepts defined yet"));
}

#[test]
fn test_corrupted_state_exits_non_zero() {
    let tmp = TempDir::new().unwrap();
    let state = state_file(tmp.path());
    fs::create_dir_all(state.parent().unwrap()).unwrap();
    fs::write(&state, "{'invalid': 'json',}").unwrap();

    let output = run(tmp.path(), &["status"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("CORRUPTION DETECTED"));
    // Corrupt file is left exactly as found
    assert_eq!(fs::read_to_string(&state).unwrap(), "{'invalid': 'json',}");
}

#[test]
fn test_schema_invalid_state_exits_non_zero() {
    let tmp = TempDir::new().unwrap();
    let state = state_file(tmp.path());
    fs::create_dir_all(state.parent().unwrap()).unwrap();
    fs::write(&state, r#"{"metadata": {"project": "test"}}"#).unwrap();

    let output = run(tmp.path(), &["status"]);
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("Failed to load state"));
    assert!(err.contains("Invalid schema"));
}

#[test]
fn test_state_override_flag() {
    let tmp = TempDir::new().unwrap();
    let output = run(tmp.path(), &["--state", "custom/map.json", "init", "demo"]);

    assert!(output.status.success());
    assert!(tmp.path().join("custom/map.json").is_file());
    assert!(!state_file(tmp.path()).exists());
}
