//! CLI tests - run the binary against the fixture checkout.

use assert_cmd::Command;
use std::path::PathBuf;

fn phonk_typegen() -> Command {
    let mut cmd = Command::cargo_bin("phonk-typegen").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

fn fixture_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../phonk-typegen/tests/fixtures/checkout")
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.output().expect("failed to execute phonk-typegen");
    assert!(output.status.success(), "{:?}", output);
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn test_generates_declarations() {
    let out = stdout_of(phonk_typegen().arg(fixture_root()));
    assert!(out.starts_with("declare class PApp {\n"));
    assert!(out.contains("declare class PButton extends PText implements PViewMethodsInterface {\n"));
    assert!(out.ends_with("export var Graphics: PGraphics;\n"));
}

#[test]
fn test_logs_stay_off_stdout() {
    let plain = stdout_of(phonk_typegen().arg(fixture_root()));
    let verbose = stdout_of(phonk_typegen().arg("-vvv").arg(fixture_root()));
    assert_eq!(plain, verbose);
}

#[test]
fn test_verbose_logs_resolved_config() {
    let output = phonk_typegen()
        .arg("-vv")
        .arg("--runner")
        .arg("Custom.java")
        .arg(fixture_root())
        .output()
        .unwrap();
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("resolved config"), "{stderr}");
    assert!(stderr.contains("Custom.java"), "{stderr}");
}

#[test]
fn test_api_dir_override() {
    let api = "PHONK-android/phonk_apprunner/src/main/java/io/phonk/runner/apprunner/api/widgets";
    let out = stdout_of(phonk_typegen().arg("--api-dir").arg(api).arg(fixture_root()));
    assert!(out.starts_with("declare class PButton extends PText"));
    assert!(!out.contains("declare class PApp"));
    // entry points are still emitted even when their types were not scanned
    assert!(out.contains("export var app: PApp;\n"));
}

#[test]
fn test_config_file_layer() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("typegen.toml");
    std::fs::write(&config, "[types.map]\nint = \"number\"\n").unwrap();

    let out = stdout_of(phonk_typegen().arg("--config").arg(&config).arg(fixture_root()));
    assert!(out.contains("  version: number;\n"));
}

#[test]
fn test_missing_runner_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = phonk_typegen().arg(dir.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("AppRunner.java"), "{stderr}");
}

#[test]
fn test_malformed_config_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("bad.toml");
    std::fs::write(&config, "[runner\n").unwrap();

    let output = phonk_typegen()
        .arg("--config")
        .arg(&config)
        .arg(fixture_root())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
}
