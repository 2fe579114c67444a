// flagforge-cli/tests/cli_commands.rs
// ============================================================================
// Module: CLI Command Tests
// Description: Integration tests driving the built binary end-to-end.
// Purpose: Exercise evaluate/rollback/disable-all against real schema and
//          snapshot files on disk.
// Dependencies: flagforge-cli binary
// ============================================================================

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn flagforge_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_flagforge"))
}

fn temp_root(label: &str) -> PathBuf {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).expect("clock drift").as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("flagforge-cli-{label}-{nanos}"));
    fs::create_dir_all(&path).expect("create temp dir");
    path
}

fn cleanup(path: &PathBuf) {
    let _ = fs::remove_dir_all(path);
}

const SCHEMA_TOML: &str = r#"
namespace_id = "app"

[[features]]
key = "darkMode"
kind = "boolean"
default = false
"#;

fn write_config(root: &std::path::Path, schema_path: &std::path::Path) -> PathBuf {
    let config_path = root.join("flagforge.toml");
    fs::write(&config_path, format!("namespace_id = \"app\"\nschema_path = \"{}\"\n", schema_path.to_string_lossy())).expect("write config");
    config_path
}

// ============================================================================
// SECTION: Tests
// ============================================================================

/// Evaluating a feature with no matching rule returns the schema default.
#[test]
fn evaluate_returns_schema_default_with_no_rules() {
    let root = temp_root("evaluate-default");
    let schema_path = root.join("schema.toml");
    fs::write(&schema_path, SCHEMA_TOML.trim()).expect("write schema");
    let config_path = write_config(&root, &schema_path);

    let snapshot_path = root.join("snapshot.json");
    fs::write(&snapshot_path, r#"{"flags": [{"key": "app::darkMode", "defaultValue": {"type": "BOOLEAN", "value": false}}]}"#).expect("write snapshot");

    let output = Command::new(flagforge_bin())
        .args(["--config", config_path.to_string_lossy().as_ref(), "evaluate"])
        .args(["--snapshot", snapshot_path.to_string_lossy().as_ref()])
        .args(["--feature", "darkMode", "--stable-id", "user-1"])
        .output()
        .expect("run evaluate");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"decision\": \"default\""), "unexpected stdout: {stdout}");
    assert!(stdout.contains("\"value\": false"), "unexpected stdout: {stdout}");

    cleanup(&root);
}

/// `disable-all` forces every evaluation to report a disabled decision.
#[test]
fn disable_all_forces_registry_disabled_decision() {
    let root = temp_root("disable-all");
    let schema_path = root.join("schema.toml");
    fs::write(&schema_path, SCHEMA_TOML.trim()).expect("write schema");
    let config_path = write_config(&root, &schema_path);

    let snapshot_path = root.join("snapshot.json");
    fs::write(&snapshot_path, r#"{"flags": [{"key": "app::darkMode", "defaultValue": {"type": "BOOLEAN", "value": true}}]}"#).expect("write snapshot");

    let output = Command::new(flagforge_bin())
        .args(["--config", config_path.to_string_lossy().as_ref(), "disable-all"])
        .args(["--snapshot", snapshot_path.to_string_lossy().as_ref()])
        .args(["--feature", "darkMode", "--stable-id", "user-1"])
        .output()
        .expect("run disable-all");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"decision\": \"registry_disabled\""), "unexpected stdout: {stdout}");

    cleanup(&root);
}

/// Rolling back one loaded snapshot restores the prior configuration.
#[test]
fn rollback_restores_the_prior_snapshot() {
    let root = temp_root("rollback");
    let schema_path = root.join("schema.toml");
    fs::write(&schema_path, SCHEMA_TOML.trim()).expect("write schema");
    let config_path = write_config(&root, &schema_path);

    let first_path = root.join("first.json");
    fs::write(&first_path, r#"{"flags": [{"key": "app::darkMode", "defaultValue": {"type": "BOOLEAN", "value": false}}]}"#).expect("write first");
    let second_path = root.join("second.json");
    fs::write(&second_path, r#"{"flags": [{"key": "app::darkMode", "defaultValue": {"type": "BOOLEAN", "value": true}}]}"#).expect("write second");

    let output = Command::new(flagforge_bin())
        .args(["--config", config_path.to_string_lossy().as_ref(), "rollback"])
        .args(["--snapshot", first_path.to_string_lossy().as_ref()])
        .args(["--snapshot", second_path.to_string_lossy().as_ref()])
        .args(["--steps", "1"])
        .output()
        .expect("run rollback");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(r#""value":false"#), "unexpected stdout: {stdout}");

    cleanup(&root);
}

/// Rolling back further than the loaded history fails with a clear error.
#[test]
fn rollback_beyond_history_fails_closed() {
    let root = temp_root("rollback-overshoot");
    let schema_path = root.join("schema.toml");
    fs::write(&schema_path, SCHEMA_TOML.trim()).expect("write schema");
    let config_path = write_config(&root, &schema_path);

    let snapshot_path = root.join("snapshot.json");
    fs::write(&snapshot_path, r#"{"flags": [{"key": "app::darkMode", "defaultValue": {"type": "BOOLEAN", "value": false}}]}"#).expect("write snapshot");

    let output = Command::new(flagforge_bin())
        .args(["--config", config_path.to_string_lossy().as_ref(), "rollback"])
        .args(["--snapshot", snapshot_path.to_string_lossy().as_ref()])
        .args(["--steps", "1"])
        .output()
        .expect("run rollback");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not enough history"), "unexpected stderr: {stderr}");

    cleanup(&root);
}
